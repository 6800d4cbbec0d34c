use crate::bridge::protocol::Command;
use crate::browser::PageSource;
use crate::extract::{ExtractionResult, TreeExtractor};
use std::sync::Arc;

/// Turns inbound command text into at most one reply
#[derive(Clone)]
pub struct MessageHandler {
    page: Arc<dyn PageSource>,
    extractor: TreeExtractor,
}

impl MessageHandler {
    pub fn new(page: Arc<dyn PageSource>, extractor: TreeExtractor) -> Self {
        Self { page, extractor }
    }

    /// Handle one inbound message. `None` means no reply is owed.
    pub async fn handle(&self, text: &str) -> Option<ExtractionResult> {
        let command = match Command::parse(text) {
            Ok(command) => command,
            Err(err) => {
                log::warn!("Error handling message: {}", err);
                return Some(err.into());
            }
        };

        log::debug!("Request from peer: {}", command.action());

        match command {
            Command::ExtractDom { node_id } => Some(self.extract_dom(&node_id).await),
            Command::Ping | Command::Unknown => None,
        }
    }

    async fn extract_dom(&self, node_id: &str) -> ExtractionResult {
        match self.page.extract_dom(node_id, &self.extractor).await {
            Ok(result) => result,
            Err(err) => {
                log::warn!("Page unavailable for node {}: {}", node_id, err);
                err.into()
            }
        }
    }
}
