use crate::error::{BridgeError, Result};
use std::time::Duration;
use url::Url;

/// Default request-source endpoint
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8765";

/// Default delay between reconnect attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Connection settings for the bridge
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeOptions {
    /// WebSocket endpoint of the request source
    pub endpoint: Url,

    /// Fixed delay between reconnect attempts (no growth, no cap on attempts)
    pub reconnect_delay: Duration,

    /// Send `{"action":"ping"}` right after each successful connect
    pub ping_on_connect: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            ping_on_connect: false,
        }
    }
}

impl BridgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint, accepting shorthand such as `localhost:8765`
    pub fn endpoint(mut self, endpoint: &str) -> Result<Self> {
        let normalized = normalize_endpoint(endpoint);
        self.endpoint =
            Url::parse(&normalized).map_err(|e| BridgeError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        Ok(self)
    }

    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn ping_on_connect(mut self, ping: bool) -> Self {
        self.ping_on_connect = ping;
        self
    }
}

/// Normalize an endpoint by adding a missing WebSocket scheme
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();

    // If already a WebSocket URL, return as-is
    if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        return trimmed.to_string();
    }

    // HTTP URLs map onto their WebSocket counterparts
    if let Some(rest) = trimmed.strip_prefix("http://") {
        return format!("ws://{}", rest);
    }
    if let Some(rest) = trimmed.strip_prefix("https://") {
        return format!("wss://{}", rest);
    }

    // Bare port - assume localhost
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return format!("ws://localhost:{}", trimmed);
    }

    format!("ws://{}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = BridgeOptions::default();
        assert_eq!(opts.endpoint.as_str(), "ws://localhost:8765/");
        assert_eq!(opts.reconnect_delay, Duration::from_millis(3000));
        assert!(!opts.ping_on_connect);
    }

    #[test]
    fn test_builder() {
        let opts = BridgeOptions::new()
            .endpoint("127.0.0.1:9000")
            .unwrap()
            .reconnect_delay(Duration::from_millis(250))
            .ping_on_connect(true);

        assert_eq!(opts.endpoint.as_str(), "ws://127.0.0.1:9000/");
        assert_eq!(opts.reconnect_delay, Duration::from_millis(250));
        assert!(opts.ping_on_connect);
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = BridgeOptions::new().endpoint("ws://exa mple:80").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_normalize_endpoint_complete() {
        assert_eq!(normalize_endpoint("ws://localhost:8765"), "ws://localhost:8765");
        assert_eq!(normalize_endpoint("wss://bridge.example.com/ws"), "wss://bridge.example.com/ws");
    }

    #[test]
    fn test_normalize_endpoint_http() {
        assert_eq!(normalize_endpoint("http://localhost:8765"), "ws://localhost:8765");
        assert_eq!(normalize_endpoint("https://bridge.example.com"), "wss://bridge.example.com");
    }

    #[test]
    fn test_normalize_endpoint_shorthand() {
        assert_eq!(normalize_endpoint("localhost:8765"), "ws://localhost:8765");
        assert_eq!(normalize_endpoint("  127.0.0.1:8765  "), "ws://127.0.0.1:8765");
        assert_eq!(normalize_endpoint("8765"), "ws://localhost:8765");
    }
}
