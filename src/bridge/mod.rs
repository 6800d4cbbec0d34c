//! Request-source connection module
//!
//! Keeps one WebSocket connection to the request source alive, decodes
//! `extract_dom` commands, runs them against the current page and replies
//! on the same connection. Reconnects on a fixed cadence for as long as the
//! process runs.

pub mod config;
pub mod handler;
pub mod manager;
pub mod protocol;
pub mod transport;

pub use config::{BridgeOptions, DEFAULT_ENDPOINT, DEFAULT_RECONNECT_DELAY, normalize_endpoint};
pub use handler::MessageHandler;
pub use manager::{ConnectionManager, ConnectionState};
pub use protocol::{Command, encode_reply};
pub use transport::{Connector, MemoryConnector, MemoryPeer, MemoryTransport, Transport, WsConnector, WsTransport};
