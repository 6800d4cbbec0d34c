use crate::bridge::config::BridgeOptions;
use crate::bridge::handler::MessageHandler;
use crate::bridge::protocol::{Command, encode_reply};
use crate::bridge::transport::{Connector, Transport};
use crate::error::{BridgeError, Result};
use tokio::time::Instant;

/// Observable connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Connection state that owns the live transport, so the two cannot disagree
enum Link<T> {
    Disconnected,
    Connecting,
    Connected(T),
}

/// Repeating reconnect timer; at most one exists per manager
#[derive(Debug, Clone, Copy)]
struct ReconnectTimer {
    next_attempt: Instant,
}

/// Owns the single connection to the request source.
///
/// All transitions happen on the task driving [`run`](Self::run); each
/// inbound command is answered before the next one is read.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    options: BridgeOptions,
    handler: MessageHandler,
    link: Link<C::Transport>,
    reconnect: Option<ReconnectTimer>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, options: BridgeOptions, handler: MessageHandler) -> Self {
        Self {
            connector,
            options,
            handler,
            link: Link::Disconnected,
            reconnect: None,
        }
    }

    pub fn current_state(&self) -> ConnectionState {
        match self.link {
            Link::Disconnected => ConnectionState::Disconnected,
            Link::Connecting => ConnectionState::Connecting,
            Link::Connected(_) => ConnectionState::Connected,
        }
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect.is_some()
    }

    /// When the pending reconnect timer fires next
    pub fn next_reconnect_at(&self) -> Option<Instant> {
        self.reconnect.map(|timer| timer.next_attempt)
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Open the connection. No-op while connecting or connected.
    pub async fn connect(&mut self) {
        if !matches!(self.link, Link::Disconnected) {
            log::debug!("Already connecting or connected");
            return;
        }

        self.link = Link::Connecting;
        log::info!("Connecting to {}", self.options.endpoint);

        // A stalled attempt must not hold up the next one on the reconnect cadence
        let deadline = self
            .next_reconnect_at()
            .unwrap_or_else(|| Instant::now() + self.options.reconnect_delay);
        let attempt = tokio::time::timeout_at(deadline, self.connector.connect(&self.options.endpoint))
            .await
            .unwrap_or_else(|_| {
                Err(BridgeError::TransportFault(format!(
                    "Timed out connecting to {}",
                    self.options.endpoint
                )))
            });

        match attempt {
            Ok(transport) => {
                log::info!("Connected to {}", self.options.endpoint);
                self.link = Link::Connected(transport);
                self.reconnect = None;

                if self.options.ping_on_connect {
                    self.send_ping().await;
                }
            }
            Err(err) => {
                log::warn!("Failed to connect: {}", err);
                self.link = Link::Disconnected;
                self.schedule_reconnect();
            }
        }
    }

    /// Record that the transport closed (peer, network or failed send)
    pub fn on_close(&mut self) {
        if matches!(self.link, Link::Connected(_)) {
            log::info!("Disconnected from {}", self.options.endpoint);
        }
        self.link = Link::Disconnected;
        self.schedule_reconnect();
    }

    /// Handle one inbound message and send its reply, if one is owed
    pub async fn on_message(&mut self, text: &str) {
        let Some(reply) = self.handler.handle(text).await else {
            return;
        };

        let node_count = reply.node_count();
        match self.send(encode_reply(&reply)).await {
            Ok(()) => log::info!("Sent response: {} nodes", node_count),
            Err(err) => {
                log::error!("{}", err);
                self.on_close();
            }
        }
    }

    async fn send_ping(&mut self) {
        let sent = match Command::Ping.to_json() {
            Ok(json) => self.send(json).await,
            Err(err) => Err(err),
        };

        match sent {
            Ok(()) => log::debug!("Sent initial ping"),
            Err(err) => {
                log::error!("Failed to send initial ping: {}", err);
                self.on_close();
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<()> {
        match &mut self.link {
            Link::Connected(transport) => transport.send(text).await,
            _ => Err(BridgeError::SendFault("transport not open".to_string())),
        }
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect.is_none() {
            let next_attempt = Instant::now() + self.options.reconnect_delay;
            log::debug!("Reconnecting in {:?}", self.options.reconnect_delay);
            self.reconnect = Some(ReconnectTimer { next_attempt });
        }
    }

    /// Wait for the reconnect timer, re-arm it and attempt to connect
    async fn reconnect_tick(&mut self) {
        if self.reconnect.is_none() {
            self.schedule_reconnect();
        }
        let Some(timer) = self.reconnect else {
            return;
        };

        tokio::time::sleep_until(timer.next_attempt).await;

        // The timer keeps its cadence until a connection succeeds
        self.reconnect = Some(ReconnectTimer {
            next_attempt: Instant::now() + self.options.reconnect_delay,
        });
        self.connect().await;
    }

    /// Drive the connection forever: serve messages while connected,
    /// reconnect on the fixed cadence while not
    pub async fn run(&mut self) {
        self.connect().await;

        loop {
            let inbound = match &mut self.link {
                Link::Connected(transport) => Some(transport.recv().await),
                _ => None,
            };

            match inbound {
                Some(Some(Ok(text))) => self.on_message(&text).await,
                Some(Some(Err(err))) => {
                    log::warn!("{}", err);
                    self.on_close();
                }
                Some(None) => self.on_close(),
                None => self.reconnect_tick().await,
            }
        }
    }
}
