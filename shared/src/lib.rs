//! Shared types for the Cobbler workspace
//!
//! Data records mirrored from the REST API, push-event payloads, error codes
//! and the payment / storage-fee calculators.

pub mod error;
pub mod message;
pub mod models;
pub mod payment;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use message::{ChangeEvent, ChannelEvent, EventName, OperationType};
pub use models::{LineItem, LineItemStatus, PaymentStatus, Transaction};
