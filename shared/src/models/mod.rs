//! Data models
//!
//! Plain records mirrored from the REST API. MongoDB `_id` is exposed as `id`;
//! everything else keeps the server's snake_case names.

pub mod analytics;
pub mod announcement;
pub mod appointment;
pub mod branch;
pub mod customer;
pub mod line_item;
pub mod payment;
pub mod promo;
pub mod transaction;
pub mod unavailability;
pub mod user;

// Re-exports
pub use analytics::*;
pub use announcement::*;
pub use appointment::*;
pub use branch::*;
pub use customer::*;
pub use line_item::*;
pub use payment::*;
pub use promo::*;
pub use transaction::*;
pub use unavailability::*;
pub use user::*;

/// A record keyed by its MongoDB `_id`
pub trait Document {
    fn document_id(&self) -> &str;
}

macro_rules! impl_document {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Document for $ty {
                fn document_id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_document!(
    Announcement,
    Appointment,
    Branch,
    Customer,
    LineItem,
    Payment,
    Promo,
    Transaction,
    Unavailability,
    User,
);
