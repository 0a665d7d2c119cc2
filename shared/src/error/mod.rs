//! Error system shared by the client crates
//!
//! - [`ErrorCode`]: numeric codes grouped by domain
//! - [`AppError`]: code + message + optional details
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::ValidationFailed, "Missing branch")
//!     .with_detail("field", "branch_id");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
