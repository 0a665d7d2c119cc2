//! API response types
//!
//! The REST API returns records as bare JSON. Failures and acknowledgements
//! carry a small body with either an `error` or a `message` field.

use serde::{Deserialize, Serialize};

/// Error body returned by the API
///
/// ```json
/// { "error": "Transaction not found" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The server's explanation, preferring `error` over `message`
    pub fn reason(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Acknowledgement body (`DELETE`, bulk updates)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    /// Documents touched, when the endpoint reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_prefers_error() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"Bad branch","message":"ignored"}"#).unwrap();
        assert_eq!(body.reason(), Some("Bad branch"));

        let body: ErrorBody = serde_json::from_str(r#"{"message":"Customer exists"}"#).unwrap();
        assert_eq!(body.reason(), Some("Customer exists"));

        let body: ErrorBody = serde_json::from_str(r#"{"error":"  "}"#).unwrap();
        assert_eq!(body.reason(), None);
    }
}
