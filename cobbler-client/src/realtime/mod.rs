// cobbler-client/src/realtime/mod.rs
// 实时模块 - 推送通道配置、错误类型和连接状态

mod channel;
pub mod frame;
mod reconcile;
mod refresh;
mod singleton;
pub mod transport;
mod watch;

pub use channel::EventChannel;
pub use reconcile::{apply_change, apply_change_by};
pub use refresh::{DelayedRefresh, REFRESH_DELAY};
pub use singleton::{disconnect_shared, is_shared_connected, shared_channel, shared_channel_with};
pub use transport::{Connector, MemoryConnector, MemoryListener, MemoryPeer, Transport, WsConnector};
pub use watch::{AppointmentWatch, LineItemWatch, WatchHandle};

pub use shared::message::{ChangeEvent, ChannelEvent, EventName};

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Push channel errors
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Malformed frame: {0}")]
    Frame(String),

    #[error("Server refused connection: {0}")]
    Rejected(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Channel closed")]
    Closed,
}

/// Connection flags, for diagnostics display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    /// Lost; a reconnect is pending
    Disconnected,
    /// Shut down for good
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// 重连策略
///
/// Defaults match the stock Socket.IO client: 1s first delay doubling up
/// to 5s, ±50% jitter, unlimited attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// 是否启用自动重连
    pub enabled: bool,
    /// 首次重连延迟
    pub initial_delay: Duration,
    /// 最大重连延迟
    pub max_delay: Duration,
    /// Jitter factor in `[0, 1]`
    pub randomization: f64,
    /// `None` 表示无限重试
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            randomization: 0.5,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay before reconnect attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_with(attempt, rand::random::<f64>())
    }

    /// Same as [`delay_for`](Self::delay_for) with the random draw supplied
    pub fn delay_with(&self, attempt: u32, draw: f64) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * 2f64.powi(attempt.min(32) as i32);
        let mut ms = base;
        if self.randomization > 0.0 {
            let deviation = (draw * self.randomization * base).floor();
            // odd tenth of the draw pushes the delay up, even pulls it down
            if (draw * 10.0).floor() as u64 & 1 == 0 {
                ms -= deviation;
            } else {
                ms += deviation;
            }
        }
        let ms = ms.clamp(0.0, self.max_delay.as_millis() as f64);
        Duration::from_millis(ms as u64)
    }

    /// Whether another attempt is allowed after `attempts` failures
    pub fn allows(&self, attempts: u32) -> bool {
        self.enabled && self.max_attempts.is_none_or(|max| attempts < max)
    }
}

/// 推送通道配置
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Socket path on the API host
    pub path: String,
    pub reconnect: ReconnectPolicy,
    /// Events buffered per subscriber before it lags
    pub capacity: usize,
    /// Time allowed for the transport plus the open/connect handshake
    pub connect_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            path: "socket.io".to_string(),
            reconnect: ReconnectPolicy::default(),
            capacity: 256,
            connect_timeout: Duration::from_secs(20),
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_reconnect_defaults() {
        let policy = ReconnectPolicy::default();
        assert!(policy.enabled);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, None);
        assert!(policy.allows(u32::MAX - 1));
    }

    #[test]
    fn test_reconnect_delay_jitter() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_with(0, 0.0), Duration::from_millis(1000));
        // 0.25 -> deviation 125, even tenth -> down
        assert_eq!(policy.delay_with(0, 0.25), Duration::from_millis(875));
        // 0.75 -> deviation 375, odd tenth -> up
        assert_eq!(policy.delay_with(0, 0.75), Duration::from_millis(1375));
        assert_eq!(policy.delay_with(1, 0.0), Duration::from_millis(2000));
        // capped
        assert_eq!(policy.delay_with(6, 0.0), Duration::from_secs(5));
        assert_eq!(policy.delay_with(u32::MAX, 0.75), Duration::from_secs(5));

        for attempt in 0..10 {
            assert!(policy.delay_for(attempt) <= Duration::from_secs(5));
        }
    }

    #[test]
    fn test_max_attempts() {
        let policy = ReconnectPolicy {
            max_attempts: Some(2),
            ..Default::default()
        };
        assert!(policy.allows(0));
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
        assert!(!ReconnectPolicy::disabled().allows(0));
    }

    #[test]
    fn test_channel_config_builder() {
        let config = ChannelConfig::new()
            .with_path("/events")
            .with_capacity(0)
            .with_reconnect(ReconnectPolicy::disabled());
        assert_eq!(config.path, "/events");
        assert_eq!(config.capacity, 1);
        assert!(!config.reconnect.enabled);
    }
}
