//! Wire format of the request-source connection.
//!
//! One JSON object per WebSocket text message. Commands carry an `action`
//! discriminant; replies are [`ExtractionResult`] envelopes.

use crate::error::{BridgeError, Result};
use crate::extract::ExtractionResult;
use serde::{Deserialize, Serialize};

/// Inbound (and, for `ping`, outbound) command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Extract the rendered subtree rooted at `node_id`
    ExtractDom { node_id: String },

    /// Keep-alive sent by the bridge after connecting
    Ping,

    /// Any other action; accepted and ignored
    #[serde(other)]
    Unknown,
}

impl Command {
    /// Decode one inbound message.
    ///
    /// Text that is not JSON, and an `extract_dom` without a usable `node_id`,
    /// are errors. A JSON value whose `action` is missing or not a string
    /// decodes as `Unknown`.
    pub fn parse(text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| BridgeError::MalformedCommand(e.to_string()))?;

        if !value.get("action").is_some_and(serde_json::Value::is_string) {
            return Ok(Command::Unknown);
        }

        serde_json::from_value(value).map_err(|e| BridgeError::MalformedCommand(e.to_string()))
    }

    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Command::ExtractDom { .. } => "extract_dom",
            Command::Ping => "ping",
            Command::Unknown => "unknown",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BridgeError::SendFault(e.to_string()))
    }
}

/// Encode a reply, degrading to a bare failure envelope if serialization fails
pub fn encode_reply(reply: &ExtractionResult) -> String {
    match serde_json::to_string(reply) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to encode reply: {}", e);
            serde_json::json!({
                "success": false,
                "error": format!("Failed to encode reply: {}", e),
            })
            .to_string()
        }
    }
}
