//! 推送通道 - 单条 Socket.IO 连接 + 后台读循环
//!
//! The background task owns the transport: it plays the open/connect
//! handshake, answers server pings, fans events out on a broadcast bus and
//! reconnects with the configured [`ReconnectPolicy`](super::ReconnectPolicy)
//! until shut down.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::frame::Packet;
use super::transport::{Connector, MemoryConnector, MemoryListener, Transport, WsConnector};
use super::{ChannelConfig, ChannelError, ConnectionState};
use crate::ClientConfig;
use shared::message::ChannelEvent;

/// Shared push-event connection
///
/// Dropping the last handle stops the background task.
#[derive(Debug)]
pub struct EventChannel {
    events: broadcast::Sender<ChannelEvent>,
    state: watch::Receiver<ConnectionState>,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventChannel {
    /// Connect to the socket endpoint of `config.base_url`
    ///
    /// Must be called within a Tokio runtime. Returns immediately; the
    /// connection is established in the background.
    pub fn connect(config: &ClientConfig) -> Self {
        let url = config.socket_url();
        tracing::info!(url = %url, "Opening event channel");
        Self::spawn(Arc::new(WsConnector::new(url)), config.channel.clone())
    }

    /// In-process channel; the listener yields the server end of every connect
    pub fn memory(config: ChannelConfig) -> (Self, MemoryListener) {
        let (connector, listener) = MemoryConnector::pair();
        (Self::spawn(Arc::new(connector), config), listener)
    }

    pub fn spawn(connector: Arc<dyn Connector>, config: ChannelConfig) -> Self {
        let (events, _) = broadcast::channel(config.capacity.max(1));
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let shutdown = CancellationToken::new();

        let worker = ChannelWorker {
            connector,
            config,
            events: events.clone(),
            state: state_tx,
            shutdown: shutdown.clone(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            events,
            state: state_rx,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// New receiver for every event delivered from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    /// Receivers currently attached to the event bus
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Wait until the server acknowledged the connection
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        let mut state = self.state.clone();
        tokio::time::timeout(
            timeout,
            state.wait_for(|s| *s == ConnectionState::Connected),
        )
        .await
        .is_ok_and(|reached| reached.is_ok())
    }

    /// Stop the background task; does not wait for it
    pub fn disconnect(&self) {
        self.shutdown.cancel();
    }

    /// Stop the background task and wait for it to finish
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Event channel task ended abnormally");
        }
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

enum SessionEnd {
    Shutdown,
    Lost,
}

struct ChannelWorker {
    connector: Arc<dyn Connector>,
    config: ChannelConfig,
    events: broadcast::Sender<ChannelEvent>,
    state: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
}

impl ChannelWorker {
    async fn run(self) {
        tracing::debug!("Event channel worker started");
        let mut failures: u32 = 0;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            self.set_state(ConnectionState::Connecting);
            let mut established = false;
            let outcome = self.session(&mut established).await;
            if established {
                failures = 0;
            }

            match outcome {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Lost) => tracing::info!("Event channel disconnected"),
                Err(e) => tracing::warn!(error = %e, "Event channel connection failed"),
            }
            self.set_state(ConnectionState::Disconnected);

            let policy = &self.config.reconnect;
            if !policy.allows(failures) {
                tracing::warn!(attempts = failures, "Event channel giving up on reconnect");
                break;
            }
            let delay = policy.delay_for(failures);
            failures = failures.saturating_add(1);
            tracing::debug!(delay_ms = delay.as_millis() as u64, attempt = failures, "Reconnecting");

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {},
            }
        }

        self.set_state(ConnectionState::Closed);
        tracing::info!("Event channel stopped");
    }

    async fn session(&self, established: &mut bool) -> Result<SessionEnd, ChannelError> {
        let transport = tokio::select! {
            _ = self.shutdown.cancelled() => return Ok(SessionEnd::Shutdown),
            connected = tokio::time::timeout(self.config.connect_timeout, self.connector.connect()) => {
                connected.map_err(|_| ChannelError::Timeout("opening transport".into()))??
            }
        };

        let outcome = self.drive(transport.as_ref(), established).await;
        if let Err(e) = transport.close().await {
            tracing::debug!(error = %e, "Error closing transport");
        }
        outcome
    }

    async fn drive(
        &self,
        transport: &dyn Transport,
        established: &mut bool,
    ) -> Result<SessionEnd, ChannelError> {
        let first = tokio::select! {
            _ = self.shutdown.cancelled() => return Ok(SessionEnd::Shutdown),
            read = tokio::time::timeout(self.config.connect_timeout, transport.read_frame()) => {
                read.map_err(|_| ChannelError::Timeout("waiting for open packet".into()))??
                    .ok_or(ChannelError::Closed)?
            }
        };

        let info = match Packet::decode(&first)? {
            Packet::Open(info) => info,
            other => {
                return Err(ChannelError::Frame(format!("expected open packet, got {:?}", other)));
            }
        };
        tracing::debug!(sid = %info.sid, ping_interval = info.ping_interval, "Engine.IO session opened");

        transport.write_frame(Packet::Connect(None).encode()).await?;
        let liveness = info.liveness_window();

        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = transport.write_frame(Packet::Disconnect.encode()).await;
                    return Ok(SessionEnd::Shutdown);
                }
                read = tokio::time::timeout(liveness, transport.read_frame()) => {
                    match read.map_err(|_| ChannelError::Timeout("no ping from server".into()))?? {
                        Some(frame) => frame,
                        None => return Ok(SessionEnd::Lost),
                    }
                }
            };

            let packet = match Packet::decode(&frame) {
                Ok(packet) => packet,
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping malformed frame");
                    continue;
                }
            };

            match packet {
                Packet::Ping(data) => transport.write_frame(Packet::Pong(data).encode()).await?,
                Packet::Connect(_) => {
                    *established = true;
                    self.set_state(ConnectionState::Connected);
                    tracing::info!(sid = %info.sid, "Event channel connected");
                }
                Packet::Event { name, payload } => self.dispatch(ChannelEvent::new(name, payload)),
                Packet::ConnectError(data) => {
                    return Err(ChannelError::Rejected(rejection_reason(&data)));
                }
                Packet::Disconnect | Packet::Close => return Ok(SessionEnd::Lost),
                Packet::Open(_) | Packet::Pong(_) | Packet::Noop => {}
            }
        }
    }

    fn dispatch(&self, event: ChannelEvent) {
        tracing::debug!(event = %event.name, "Event received");
        if let Err(broadcast::error::SendError(event)) = self.events.send(event) {
            tracing::debug!(event = %event.name, "No subscribers for event");
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "Event channel state changed");
        }
    }
}

fn rejection_reason(data: &serde_json::Value) -> String {
    data.get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ReconnectPolicy;
    use serde_json::json;

    fn quick_config() -> ChannelConfig {
        ChannelConfig::default()
            .with_connect_timeout(Duration::from_secs(2))
            .with_reconnect(ReconnectPolicy {
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(20),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_handshake_and_event_delivery() {
        let (channel, mut listener) = EventChannel::memory(quick_config());
        let mut rx = channel.subscribe();

        let mut peer = listener.accept().await.unwrap();
        peer.accept_handshake("s1").await.unwrap();
        assert!(channel.wait_connected(Duration::from_secs(1)).await);

        assert!(peer.emit("lineItemUpdated", json!({"operationType": "update"})));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, "lineItemUpdated");
        assert_eq!(event.payload["operationType"], "update");

        channel.shutdown().await;
        assert_eq!(channel.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_answers_ping() {
        let (channel, mut listener) = EventChannel::memory(quick_config());
        let mut peer = listener.accept().await.unwrap();
        peer.accept_handshake("s1").await.unwrap();

        assert!(peer.send_frame("2"));
        assert_eq!(peer.recv().await.as_deref(), Some("3"));

        channel.shutdown().await;
        // polite disconnect on shutdown
        assert_eq!(peer.recv().await.as_deref(), Some("41"));
    }

    #[tokio::test]
    async fn test_reconnects_after_server_drop() {
        let (channel, mut listener) = EventChannel::memory(quick_config());

        let mut first = listener.accept().await.unwrap();
        first.accept_handshake("s1").await.unwrap();
        assert!(channel.wait_connected(Duration::from_secs(1)).await);
        drop(first);

        let mut second = listener.accept().await.unwrap();
        second.accept_handshake("s2").await.unwrap();
        assert!(channel.wait_connected(Duration::from_secs(1)).await);

        channel.shutdown().await;
    }

    #[tokio::test]
    async fn test_connect_error_without_reconnect_closes() {
        let config = quick_config().with_reconnect(ReconnectPolicy::disabled());
        let (channel, mut listener) = EventChannel::memory(config);

        let mut peer = listener.accept().await.unwrap();
        assert!(peer.send_frame(r#"0{"sid":"s1","pingInterval":25000,"pingTimeout":20000}"#));
        assert_eq!(peer.recv().await.as_deref(), Some("40"));
        assert!(peer.send_frame(r#"44{"message":"Not authorized"}"#));

        let mut state = channel.state_changes();
        let closed = tokio::time::timeout(
            Duration::from_secs(1),
            state.wait_for(|s| *s == ConnectionState::Closed),
        )
        .await
        .is_ok_and(|reached| reached.is_ok());
        assert!(closed);
        assert!(!channel.is_connected());
    }

    #[test]
    fn test_rejection_reason() {
        assert_eq!(rejection_reason(&json!({"message": "nope"})), "nope");
        assert_eq!(rejection_reason(&json!("raw")), "\"raw\"");
    }
}
