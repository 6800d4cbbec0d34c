use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// An open, message-oriented connection to the request source
#[async_trait]
pub trait Transport: Send {
    /// Next inbound text message; `None` once the peer has closed
    async fn recv(&mut self) -> Option<Result<String>>;

    async fn send(&mut self, text: String) -> Result<()>;
}

/// Opens transports to an endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn connect(&self, endpoint: &Url) -> Result<Self::Transport>;
}

/// WebSocket connector
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, endpoint: &Url) -> Result<WsTransport> {
        let (stream, _) = connect_async(endpoint.clone())
            .await
            .map_err(|e| BridgeError::TransportFault(format!("Failed to connect to {}: {}", endpoint, e)))?;
        Ok(WsTransport { stream })
    }
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn recv(&mut self) -> Option<Result<String>> {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => log::debug!("Ignoring non-UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    log::debug!("Peer sent close frame: {:?}", frame);
                    return None;
                }
                // Pings are answered by tungstenite on the next read/write
                Ok(_) => {}
                Err(e) => return Some(Err(BridgeError::TransportFault(e.to_string()))),
            }
        }
        None
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| BridgeError::SendFault(e.to_string()))
    }
}

/// In-process connector backed by channels.
///
/// Each queued [`MemoryPeer`] is handed out by one successful `connect`;
/// when the queue is empty, connecting fails like a refused socket.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    pending: Arc<Mutex<VecDeque<MemoryTransport>>>,
    attempts: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a connection for the next successful `connect` and return its peer end
    pub async fn accept_next(&self) -> MemoryPeer {
        let (to_bridge, inbound) = mpsc::unbounded_channel();
        let (outbound, from_bridge) = mpsc::unbounded_channel();
        self.pending
            .lock()
            .await
            .push_back(MemoryTransport { inbound, outbound });
        MemoryPeer {
            to_bridge,
            from_bridge,
        }
    }

    /// Number of `connect` calls so far, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self, endpoint: &Url) -> Result<MemoryTransport> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.pending
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| BridgeError::TransportFault(format!("Connection refused: {}", endpoint)))
    }
}

/// Bridge end of an in-process connection
pub struct MemoryTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn recv(&mut self) -> Option<Result<String>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.outbound
            .send(text)
            .map_err(|_| BridgeError::SendFault("peer went away".to_string()))
    }
}

/// Request-source end of an in-process connection. Dropping it closes the connection.
pub struct MemoryPeer {
    to_bridge: mpsc::UnboundedSender<String>,
    from_bridge: mpsc::UnboundedReceiver<String>,
}

impl MemoryPeer {
    pub fn send(&self, text: impl Into<String>) -> Result<()> {
        self.to_bridge
            .send(text.into())
            .map_err(|_| BridgeError::SendFault("bridge went away".to_string()))
    }

    /// Next message from the bridge; `None` once the bridge dropped its end
    pub async fn recv(&mut self) -> Option<String> {
        self.from_bridge.recv().await
    }

    /// Message already sent by the bridge, without waiting
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_bridge.try_recv().ok()
    }
}
