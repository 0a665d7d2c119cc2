//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    ///
    /// `message` comes from the JSON body (`error` / `message`) or, failing
    /// that, the status text.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bad configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local business rule rejected the operation
    #[error(transparent)]
    App(#[from] AppError),
}

impl ClientError {
    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Map onto the shared error codes
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::App(e) => e.code,
            Self::Config(_) => ErrorCode::InvalidRequest,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InternalError,
            other => other
                .status()
                .map(ErrorCode::from_http_status)
                .unwrap_or(ErrorCode::ServiceUnavailable),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Swallow a failed request and keep going with an empty value
///
/// For views that must keep rendering: the error is logged and
/// `T::default()` (empty list, `None`, zeroed summary) is returned.
pub trait Fallback<T> {
    fn or_fallback(self, context: &str) -> T;
}

impl<T: Default> Fallback<T> for ClientResult<T> {
    fn or_fallback(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(context, error = %e, "Request failed, using fallback");
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_is_server_message() {
        let err = ClientError::Api {
            status: 404,
            message: "Transaction not found".into(),
        };
        assert_eq!(err.to_string(), "Transaction not found");
        assert!(err.is_not_found());
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_fallback() {
        let ok: ClientResult<Vec<u32>> = Ok(vec![1, 2]);
        assert_eq!(ok.or_fallback("list"), vec![1, 2]);

        let failed: ClientResult<Vec<u32>> = Err(ClientError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert!(failed.or_fallback("list").is_empty());

        let missing: ClientResult<Option<String>> = Err(ClientError::InvalidResponse("x".into()));
        assert_eq!(missing.or_fallback("get"), None);
    }

    #[test]
    fn test_app_error_code_passthrough() {
        let err: ClientError = AppError::new(ErrorCode::PaymentAlreadySettled).into();
        assert_eq!(err.code(), ErrorCode::PaymentAlreadySettled);
        assert_eq!(err.status(), None);
    }
}
