//! Cobbler Client - REST and push-channel client for the shop API
//!
//! Typed endpoint wrappers over the REST API, the shared real-time event
//! channel with its watchers, and logging setup. Records and the payment
//! calculators live in the `shared` crate.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod realtime;

pub use api::{
    AnalyticsQuery, AppointmentQuery, LineItemQuery, PaymentReceipt, TransactionQuery,
    TransactionView,
};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, Fallback};
pub use http::ApiClient;

// Real-time channel
pub use realtime::{
    AppointmentWatch, ChannelConfig, ChannelError, ConnectionState, EventChannel, LineItemWatch,
    ReconnectPolicy, WatchHandle, disconnect_shared, shared_channel,
};

// Re-export shared types for convenience
pub use shared::message::{ChangeEvent, ChannelEvent, EventName};
pub use shared::models;
pub use shared::payment;
