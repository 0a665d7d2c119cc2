//! Per-resource API wrappers
//!
//! Each module adds an `impl ApiClient` block for one REST resource. Paths
//! take the record's `_id` (`id` field); bodies are the shared DTOs.

mod analytics;
mod announcements;
mod appointments;
mod branches;
mod customers;
mod line_items;
mod payments;
mod promos;
mod transactions;
mod unavailability;
mod users;

pub use analytics::AnalyticsQuery;
pub use appointments::AppointmentQuery;
pub use line_items::LineItemQuery;
pub use payments::PaymentReceipt;
pub use transactions::{TransactionQuery, TransactionView};
