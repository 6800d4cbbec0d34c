use thiserror::Error;

/// Errors produced while bridging extraction requests to a page
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The requested node has no element in the current document
    #[error("Node {0} not found in DOM (may be collapsed or not loaded)")]
    NodeNotFound(String),

    /// No page holding the target document is reachable
    #[error("No {0} tab open")]
    NoTargetAvailable(String),

    /// Unexpected fault while walking the document
    #[error("Extraction failed: {0}")]
    ExtractionFault(String),

    /// Inbound text could not be decoded as a command
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// Connect failure or mid-flight close of the transport
    #[error("Transport error: {0}")]
    TransportFault(String),

    /// A reply could not be written to the transport
    #[error("Failed to send reply: {0}")]
    SendFault(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// The page could not be captured or the captured snapshot is unreadable
    #[error("Failed to snapshot DOM: {0}")]
    SnapshotFailed(String),
}

impl BridgeError {
    /// Whether this error belongs to the connection rather than to a single request
    pub fn is_transport(&self) -> bool {
        matches!(self, BridgeError::TransportFault(_) | BridgeError::SendFault(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BridgeError>;
