use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::ChannelError;
use super::frame::{OpenInfo, Packet};

/// Text-frame transport under the push channel
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Next text frame; `Ok(None)` once the peer has closed
    async fn read_frame(&self) -> Result<Option<String>, ChannelError>;
    async fn write_frame(&self, frame: String) -> Result<(), ChannelError>;
    async fn close(&self) -> Result<(), ChannelError>;
}

/// Opens a fresh transport for every (re)connect
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    async fn connect(&self) -> Result<Box<dyn Transport>, ChannelError>;
}

// ==================== WebSocket ====================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport
#[derive(Debug)]
pub struct WsTransport {
    reader: Mutex<SplitStream<WsStream>>,
    writer: Mutex<SplitSink<WsStream, Message>>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self, ChannelError> {
        let (ws, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect(format!("{}: {}", url, e)))?;
        let (writer, reader) = ws.split();
        Ok(Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn read_frame(&self) -> Result<Option<String>, ChannelError> {
        let mut reader = self.reader.lock().await;
        loop {
            match reader.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Ping(data))) => {
                    self.writer.lock().await.send(Message::Pong(data)).await?;
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(other)) => {
                    tracing::debug!(kind = ?other, "Ignoring non-text WebSocket frame");
                }
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    async fn write_frame(&self, frame: String) -> Result<(), ChannelError> {
        let mut writer = self.writer.lock().await;
        writer.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ChannelError> {
        let mut writer = self.writer.lock().await;
        writer.close().await?;
        Ok(())
    }
}

/// Connects [`WsTransport`]s to a fixed URL
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, ChannelError> {
        let transport = WsTransport::connect(&self.url).await?;
        Ok(Box::new(transport))
    }
}

// ==================== Memory ====================

/// In-process transport, one end of a frame pipe
#[derive(Debug)]
pub struct MemoryTransport {
    /// Frames FROM the peer
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
    /// Frames TO the peer
    tx: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_frame(&self) -> Result<Option<String>, ChannelError> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn write_frame(&self, frame: String) -> Result<(), ChannelError> {
        self.tx.send(frame).map_err(|_| ChannelError::Closed)
    }

    async fn close(&self) -> Result<(), ChannelError> {
        self.rx.lock().await.close();
        Ok(())
    }
}

/// Server side of a [`MemoryTransport`], driven by tests
#[derive(Debug)]
pub struct MemoryPeer {
    rx: mpsc::UnboundedReceiver<String>,
    tx: mpsc::UnboundedSender<String>,
}

impl MemoryPeer {
    /// Send a raw frame; `false` once the client end is gone
    pub fn send_frame(&self, frame: impl Into<String>) -> bool {
        self.tx.send(frame.into()).is_ok()
    }

    pub fn send(&self, packet: &Packet) -> bool {
        self.send_frame(packet.encode())
    }

    /// Emit a named event to the client
    pub fn emit(&self, name: &str, payload: serde_json::Value) -> bool {
        self.send(&Packet::event(name, payload))
    }

    /// Next frame written by the client; `None` once it hung up
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Play the server side of the open/connect handshake
    pub async fn accept_handshake(&mut self, sid: &str) -> Result<(), ChannelError> {
        let open = OpenInfo {
            sid: sid.to_string(),
            upgrades: Vec::new(),
            ping_interval: 25_000,
            ping_timeout: 20_000,
            max_payload: 1_000_000,
        };
        if !self.send(&Packet::Open(open)) {
            return Err(ChannelError::Closed);
        }

        let frame = self.recv().await.ok_or(ChannelError::Closed)?;
        match Packet::decode(&frame)? {
            Packet::Connect(_) => {}
            other => {
                return Err(ChannelError::Frame(format!("expected connect, got {:?}", other)));
            }
        }

        let ack = Packet::Connect(Some(serde_json::json!({ "sid": sid })));
        if self.send(&ack) {
            Ok(())
        } else {
            Err(ChannelError::Closed)
        }
    }
}

fn memory_pair() -> (MemoryTransport, MemoryPeer) {
    let (to_client, from_peer) = mpsc::unbounded_channel();
    let (to_peer, from_client) = mpsc::unbounded_channel();
    (
        MemoryTransport {
            rx: Mutex::new(from_peer),
            tx: to_peer,
        },
        MemoryPeer {
            rx: from_client,
            tx: to_client,
        },
    )
}

/// Hands out [`MemoryTransport`]s; each connect shows up on the listener
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    peers: mpsc::UnboundedSender<MemoryPeer>,
}

/// Receives the peer end of every [`MemoryConnector::connect`]
#[derive(Debug)]
pub struct MemoryListener {
    peers: mpsc::UnboundedReceiver<MemoryPeer>,
}

impl MemoryConnector {
    pub fn pair() -> (Self, MemoryListener) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { peers: tx }, MemoryListener { peers: rx })
    }
}

impl MemoryListener {
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.peers.recv().await
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, ChannelError> {
        let (transport, peer) = memory_pair();
        self.peers
            .send(peer)
            .map_err(|_| ChannelError::Connect("memory listener dropped".into()))?;
        Ok(Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pipe() {
        let (connector, mut listener) = MemoryConnector::pair();
        let transport = connector.connect().await.unwrap();
        let mut peer = listener.accept().await.unwrap();

        assert!(peer.send_frame("2"));
        assert_eq!(transport.read_frame().await.unwrap().as_deref(), Some("2"));

        transport.write_frame("3".into()).await.unwrap();
        assert_eq!(peer.recv().await.as_deref(), Some("3"));

        drop(peer);
        assert_eq!(transport.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connect_without_listener_fails() {
        let (connector, listener) = MemoryConnector::pair();
        drop(listener);
        assert!(matches!(
            connector.connect().await,
            Err(ChannelError::Connect(_))
        ));
    }
}
