use crate::browser::target::TargetPattern;
use crate::dom::DomSnapshot;
use crate::error::{BridgeError, Result};
use crate::extract::{ExtractionResult, TreeExtractor};
use async_trait::async_trait;
use std::path::PathBuf;

/// Access to the document an `extract_dom` command runs against.
///
/// Returns `Err(BridgeError::NoTargetAvailable)` when there is no page at all;
/// the extractor must not be invoked in that case.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn extract_dom(&self, node_id: &str, extractor: &TreeExtractor) -> Result<ExtractionResult>;
}

/// A fixed, in-memory document (or none)
#[derive(Debug, Clone)]
pub struct SnapshotPage {
    snapshot: Option<DomSnapshot>,
    target: TargetPattern,
}

impl SnapshotPage {
    pub fn new(snapshot: DomSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            target: TargetPattern::default(),
        }
    }

    /// A page source with no document behind it
    pub fn empty() -> Self {
        Self {
            snapshot: None,
            target: TargetPattern::default(),
        }
    }

    pub fn with_target(mut self, target: TargetPattern) -> Self {
        self.target = target;
        self
    }
}

#[async_trait]
impl PageSource for SnapshotPage {
    async fn extract_dom(&self, node_id: &str, extractor: &TreeExtractor) -> Result<ExtractionResult> {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| BridgeError::NoTargetAvailable(self.target.label.clone()))?;
        Ok(extractor.extract(snapshot, node_id))
    }
}

/// A snapshot JSON file, re-read on every request so edits show up live
#[derive(Debug, Clone)]
pub struct SnapshotFilePage {
    path: PathBuf,
    target: TargetPattern,
}

impl SnapshotFilePage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            target: TargetPattern::default(),
        }
    }

    pub fn with_target(mut self, target: TargetPattern) -> Self {
        self.target = target;
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl PageSource for SnapshotFilePage {
    async fn extract_dom(&self, node_id: &str, extractor: &TreeExtractor) -> Result<ExtractionResult> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Snapshot file {} does not exist", self.path.display());
                return Err(BridgeError::NoTargetAvailable(self.target.label.clone()));
            }
            Err(e) => {
                return Err(BridgeError::SnapshotFailed(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let snapshot = DomSnapshot::from_json(&json)?;
        Ok(extractor.extract(&snapshot, node_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;
    use crate::extract::OutlineLayout;

    fn snapshot() -> DomSnapshot {
        let layout = OutlineLayout::default();
        DomSnapshot::new(ElementNode::new("body").with_children([layout.element("A", Some("Alpha"), None, None)]))
    }

    #[tokio::test]
    async fn test_snapshot_page_extracts() {
        let page = SnapshotPage::new(snapshot());
        let result = page.extract_dom("A", &TreeExtractor::default()).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.node_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_page_has_no_target() {
        let page = SnapshotPage::empty();
        let err = page.extract_dom("A", &TreeExtractor::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "No Workflowy tab open");

        let page = SnapshotPage::empty().with_target(TargetPattern::new("example.org", "Example"));
        let err = page.extract_dom("A", &TreeExtractor::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "No Example tab open");
    }

    #[tokio::test]
    async fn test_snapshot_file_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        let page = SnapshotFilePage::new(&path);

        let err = page.extract_dom("A", &TreeExtractor::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::NoTargetAvailable(_)));

        let layout = OutlineLayout::default();
        let root = ElementNode::new("body").with_children([layout.element("A", Some("Alpha"), Some("n"), None)]);
        std::fs::write(&path, DomSnapshot::new(root).to_json().unwrap()).unwrap();

        let result = page.extract_dom("A", &TreeExtractor::default()).await.unwrap();
        match result {
            ExtractionResult::Success(tree) => {
                assert_eq!(tree.root.name, "Alpha");
                assert_eq!(tree.root.note.as_deref(), Some("n"));
            }
            ExtractionResult::Failure { error } => panic!("Expected success, got: {}", error),
        }

        std::fs::write(&path, "{ broken").unwrap();
        let err = page.extract_dom("A", &TreeExtractor::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::SnapshotFailed(_)));
    }

    /// `levels` nested outline nodes `n0 > n1 > ..`, inside five plain wrapper divs
    fn deep_outline(levels: usize) -> ElementNode {
        let layout = OutlineLayout::default();
        let mut node = layout.element(&format!("n{}", levels - 1), Some("leaf"), None, Some(vec![]));
        for level in (0..levels - 1).rev() {
            node = layout.element(&format!("n{}", level), Some("level"), None, Some(vec![node]));
        }
        (0..5).fold(node, |inner, _| ElementNode::new("div").with_children([inner]))
    }

    #[tokio::test]
    async fn test_snapshot_file_with_deep_outline() {
        let layout = OutlineLayout::default();
        let root = ElementNode::new("body").with_children([
            layout.element("shallow", Some("Shallow"), None, None),
            deep_outline(60),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.json");
        std::fs::write(&path, DomSnapshot::new(root).to_json().unwrap()).unwrap();
        let page = SnapshotFilePage::new(&path);

        let shallow = page.extract_dom("shallow", &TreeExtractor::default()).await.unwrap();
        assert!(shallow.is_success(), "{:?}", shallow.error());
        assert_eq!(shallow.node_count(), 1);

        match page.extract_dom("n0", &TreeExtractor::default()).await.unwrap() {
            ExtractionResult::Success(tree) => {
                assert_eq!(tree.node_count, 60);
                assert_eq!(tree.depth, 59);
                assert_eq!(tree.root.parent_id, None);
            }
            ExtractionResult::Failure { error } => panic!("Expected success, got: {}", error),
        }

        let middle = page.extract_dom("n30", &TreeExtractor::default()).await.unwrap();
        assert_eq!(middle.node_count(), 30);
    }
}
