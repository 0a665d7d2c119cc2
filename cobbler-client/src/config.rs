//! Client configuration
//!
//! | Environment variable | Default | Meaning |
//! |---|---|---|
//! | `COBBLER_API_BASE_URL` | `http://localhost:3000` | API and socket host |
//! | `COBBLER_REQUEST_TIMEOUT_SECS` | `30` | REST request timeout |

use crate::error::{ClientError, ClientResult};
use crate::realtime::ChannelConfig;

/// Base URL variable, the one externally significant setting
pub const BASE_URL_ENV: &str = "COBBLER_API_BASE_URL";
/// Request timeout variable (seconds)
pub const TIMEOUT_ENV: &str = "COBBLER_REQUEST_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration for connecting to the API server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "https://api.example.com"), without `/api`
    pub base_url: String,

    /// Bearer token attached to every request, if any
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Real-time channel settings
    pub channel: ChannelConfig,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            channel: ChannelConfig::default(),
        }
    }

    /// Load from the process environment (a `.env` file is honoured)
    pub fn from_env() -> ClientResult<Self> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "{} must start with http:// or https://, got {:?}",
                BASE_URL_ENV, base_url
            )));
        }

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("{} must be a number of seconds, got {:?}", TIMEOUT_ENV, raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(base_url).with_timeout(timeout))
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the real-time channel configuration
    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    /// Full URL for an API path such as `/api/customers`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// WebSocket URL of the push channel on the same host
    pub fn socket_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!(
            "{}/{}/?EIO=4&transport=websocket",
            ws_base,
            self.channel.path.trim_matches('/')
        )
    }

    /// Create an API client from this configuration
    pub fn build_api_client(&self) -> ClientResult<crate::ApiClient> {
        crate::ApiClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, 30);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (BASE_URL_ENV, "https://api.shoes.example/"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.shoes.example");
        assert_eq!(config.timeout, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(BASE_URL_ENV, "ftp://x")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let err = ClientConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_urls() {
        let config = ClientConfig::new("https://api.shoes.example");
        assert_eq!(
            config.api_url("/api/line-items"),
            "https://api.shoes.example/api/line-items"
        );
        assert_eq!(
            config.socket_url(),
            "wss://api.shoes.example/socket.io/?EIO=4&transport=websocket"
        );

        let local = ClientConfig::new("http://127.0.0.1:3000/");
        assert_eq!(
            local.socket_url(),
            "ws://127.0.0.1:3000/socket.io/?EIO=4&transport=websocket"
        );
    }
}
