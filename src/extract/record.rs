use serde::{Deserialize, Serialize};

/// One node of an extracted tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub id: String,

    /// Primary text, trimmed
    pub name: String,

    /// Secondary text, untrimmed; `None` when absent or blank
    pub note: Option<String>,

    pub parent_id: Option<String>,

    /// Rendered children in document order
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    /// Number of records in this subtree, this one included
    pub fn subtree_size(&self) -> usize {
        1 + count_nodes(&self.children)
    }

    /// Levels below this record (a leaf has height 0)
    pub fn height(&self) -> usize {
        max_depth(&self.children)
    }
}

/// The extraction root's own fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootRecord {
    pub id: String,
    pub name: String,
    pub note: Option<String>,
    pub parent_id: Option<String>,
}

/// Successful extraction: the root, its rendered subtree and aggregates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedTree {
    pub root: RootRecord,
    pub children: Vec<NodeRecord>,

    /// Root plus every record below it
    pub node_count: usize,

    /// Levels below the root
    pub depth: usize,
}

impl ExtractedTree {
    /// Assemble a tree, deriving `node_count` and `depth` from `children`
    pub fn new(root: RootRecord, children: Vec<NodeRecord>) -> Self {
        let node_count = 1 + count_nodes(&children);
        let depth = max_depth(&children);
        Self {
            root,
            children,
            node_count,
            depth,
        }
    }
}

/// Outcome of one extraction request, and the reply envelope sent back to the peer.
///
/// On the wire this is `{"success": true, root, children, node_count, depth}`
/// or `{"success": false, "error": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(into = "ReplyWire", try_from = "ReplyWire")]
pub enum ExtractionResult {
    Success(ExtractedTree),
    Failure { error: String },
}

impl ExtractionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        ExtractionResult::Failure { error: error.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success(_))
    }

    /// Node count of a success, 0 for a failure
    pub fn node_count(&self) -> usize {
        match self {
            ExtractionResult::Success(tree) => tree.node_count,
            ExtractionResult::Failure { .. } => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success(_) => None,
            ExtractionResult::Failure { error } => Some(error),
        }
    }
}

impl From<crate::error::BridgeError> for ExtractionResult {
    fn from(err: crate::error::BridgeError) -> Self {
        ExtractionResult::failure(err.to_string())
    }
}

#[derive(Serialize, Deserialize)]
struct ReplyWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<RootRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<NodeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    node_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ExtractionResult> for ReplyWire {
    fn from(result: ExtractionResult) -> Self {
        match result {
            ExtractionResult::Success(tree) => ReplyWire {
                success: true,
                root: Some(tree.root),
                children: Some(tree.children),
                node_count: Some(tree.node_count),
                depth: Some(tree.depth),
                error: None,
            },
            ExtractionResult::Failure { error } => ReplyWire {
                success: false,
                root: None,
                children: None,
                node_count: None,
                depth: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<ReplyWire> for ExtractionResult {
    type Error = String;

    fn try_from(wire: ReplyWire) -> Result<Self, Self::Error> {
        if !wire.success {
            return Ok(ExtractionResult::Failure {
                error: wire.error.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        let root = wire.root.ok_or("success reply without root")?;
        let children = wire.children.unwrap_or_default();
        let mut tree = ExtractedTree::new(root, children);
        if let Some(node_count) = wire.node_count {
            tree.node_count = node_count;
        }
        if let Some(depth) = wire.depth {
            tree.depth = depth;
        }
        Ok(ExtractionResult::Success(tree))
    }
}

/// Total records in a forest
pub fn count_nodes(nodes: &[NodeRecord]) -> usize {
    nodes.iter().map(NodeRecord::subtree_size).sum()
}

/// Levels in a forest: 0 when empty, 1 for a forest of leaves
pub fn max_depth(nodes: &[NodeRecord]) -> usize {
    nodes.iter().map(|n| 1 + n.height()).max().unwrap_or(0)
}

/// Indented outline of a forest, `◉` for nodes with children and `●` for leaves
pub fn render_outline(nodes: &[NodeRecord]) -> String {
    let mut out = String::new();
    render_level(nodes, 0, &mut out);
    out
}

fn render_level(nodes: &[NodeRecord], level: usize, out: &mut String) {
    let indent = "    ".repeat(level);
    for node in nodes {
        let bullet = if node.children.is_empty() { '●' } else { '◉' };
        out.push_str(&format!("{}{} {}\n", indent, bullet, node.name));
        render_level(&node.children, level + 1, out);
    }
}
