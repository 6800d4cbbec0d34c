use crate::dom::document::Document;
use crate::dom::element::{ElementNode, TEXT_NODE_TAG, is_pruned_tag};
use crate::error::{BridgeError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Handle to an element inside a [`DomSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// One node of the flat snapshot format.
///
/// A snapshot is a JSON array of these in document (pre-)order; `parent` is
/// the index of the parent entry and is `null` only for the first one. The
/// format carries no nesting, so page depth is not bounded by the JSON parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FlatNode {
    pub tag_name: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    #[serde(default)]
    pub parent: Option<usize>,
}

#[derive(Debug, Clone)]
struct SnapshotNode {
    tag_name: String,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Immutable, arena-backed copy of a rendered DOM.
///
/// Nodes are stored in document (pre-)order with parent links, so upward
/// walks and document-order searches need no re-traversal of the tree.
/// Script, style and noscript subtrees are never part of a snapshot.
#[derive(Debug, Clone)]
pub struct DomSnapshot {
    nodes: Vec<SnapshotNode>,
}

impl DomSnapshot {
    /// Index a captured node tree
    pub fn new(mut root: ElementNode) -> Self {
        root.simplify();
        let mut nodes = Vec::new();
        Self::push_static(root, None, &mut nodes);
        Self { nodes }
    }

    /// Parse the flat JSON produced by the page snapshot script or a snapshot file
    pub fn from_json(json: &str) -> Result<Self> {
        let nodes: Vec<FlatNode> = serde_json::from_str(json)
            .map_err(|e| BridgeError::SnapshotFailed(format!("Failed to parse DOM JSON: {}", e)))?;
        Self::from_nodes(nodes)
    }

    /// Build a snapshot from flat nodes.
    ///
    /// Every entry after the first must name a parent that precedes it.
    /// Siblings keep their input order.
    pub fn from_nodes(nodes: Vec<FlatNode>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(BridgeError::SnapshotFailed("Snapshot contains no nodes".to_string()));
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut kept = vec![false; nodes.len()];

        for (index, node) in nodes.iter().enumerate() {
            match (index, node.parent) {
                (0, None) => kept[0] = true,
                (0, Some(_)) => {
                    return Err(BridgeError::SnapshotFailed("Snapshot root has a parent".to_string()));
                }
                (_, Some(parent)) if parent < index => {
                    kept[index] = kept[parent] && !is_pruned_tag(&node.tag_name);
                    if kept[index] {
                        children[parent].push(index);
                    }
                }
                (_, parent) => {
                    return Err(BridgeError::SnapshotFailed(format!(
                        "Snapshot node {} has invalid parent {:?}",
                        index, parent
                    )));
                }
            }
        }

        let mut slots: Vec<Option<FlatNode>> = nodes.into_iter().map(Some).collect();
        let mut arena: Vec<SnapshotNode> = Vec::with_capacity(kept.iter().filter(|&&k| k).count());
        let mut stack = vec![(0usize, None::<usize>)];

        while let Some((source, parent)) = stack.pop() {
            let Some(node) = slots[source].take() else {
                continue;
            };

            let index = arena.len();
            arena.push(SnapshotNode {
                tag_name: node.tag_name,
                attributes: node.attributes,
                text: node.text_content,
                parent,
                children: Vec::with_capacity(children[source].len()),
            });
            if let Some(parent) = parent {
                arena[parent].children.push(index);
            }

            stack.extend(children[source].iter().rev().map(|&child| (child, Some(index))));
        }

        Ok(Self { nodes: arena })
    }

    /// Flat, pre-order form of this snapshot
    pub fn to_nodes(&self) -> Vec<FlatNode> {
        self.nodes
            .iter()
            .map(|node| FlatNode {
                tag_name: node.tag_name.clone(),
                attributes: node.attributes.clone(),
                text_content: node.text.clone(),
                parent: node.parent,
            })
            .collect()
    }

    /// Serialize to the flat snapshot format read by [`from_json`](Self::from_json)
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_nodes())
            .map_err(|e| BridgeError::SnapshotFailed(format!("Failed to encode DOM JSON: {}", e)))
    }

    fn push_static(node: ElementNode, parent: Option<usize>, nodes: &mut Vec<SnapshotNode>) -> usize {
        let index = nodes.len();
        nodes.push(SnapshotNode {
            tag_name: node.tag_name,
            attributes: node.attributes,
            text: node.text_content,
            parent,
            children: Vec::with_capacity(node.children.len()),
        });

        for child in node.children {
            let child_index = Self::push_static(child, Some(index), nodes);
            nodes[index].children.push(child_index);
        }

        index
    }

    /// Root element of the snapshot
    pub fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    /// Number of captured nodes, text nodes included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, handle: NodeHandle) -> &SnapshotNode {
        &self.nodes[handle.0]
    }

    fn is_text(&self, index: usize) -> bool {
        self.nodes[index].tag_name == TEXT_NODE_TAG
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }
}

impl Document for DomSnapshot {
    type Node = NodeHandle;

    fn find_element(&self, tag: &str, attribute: &str, value: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .position(|node| {
                node.tag_name.eq_ignore_ascii_case(tag)
                    && node.attributes.get(attribute).map(String::as_str) == Some(value)
            })
            .map(NodeHandle)
    }

    fn tag_name(&self, node: NodeHandle) -> &str {
        &self.node(node).tag_name
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<&str> {
        self.node(node).attributes.get(name).map(String::as_str)
    }

    fn parent_element(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node).parent.map(NodeHandle)
    }

    fn element_children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.node(node)
            .children
            .iter()
            .copied()
            .filter(|&child| !self.is_text(child))
            .map(NodeHandle)
            .collect()
    }

    fn text_content(&self, node: NodeHandle) -> String {
        let mut out = String::new();
        self.collect_text(node.0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> ElementNode {
        ElementNode::new("body").with_children([
            ElementNode::new("div")
                .with_attribute("projectid", "outer")
                .with_text("Outer ")
                .with_children([ElementNode::new("div")
                    .with_attribute("projectid", "inner")
                    .with_text("inner")]),
            ElementNode::new("span").with_attribute("projectid", "outer"),
        ])
    }

    #[test]
    fn test_snapshot_creation() {
        let snapshot = DomSnapshot::new(create_test_tree());

        // body, outer div, text, inner div, text, span
        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot.tag_name(snapshot.root()), "body");
    }

    #[test]
    fn test_find_element_respects_tag_and_document_order() {
        let snapshot = DomSnapshot::new(create_test_tree());

        let outer = snapshot.find_element("DIV", "projectid", "outer").unwrap();
        assert_eq!(snapshot.tag_name(outer), "div");

        assert!(snapshot.find_element("span", "projectid", "inner").is_none());
        assert!(snapshot.find_element("div", "projectid", "missing").is_none());
    }

    #[test]
    fn test_parent_links() {
        let snapshot = DomSnapshot::new(create_test_tree());

        let inner = snapshot.find_element("div", "projectid", "inner").unwrap();
        let outer = snapshot.parent_element(inner).unwrap();
        assert_eq!(snapshot.attribute(outer, "projectid"), Some("outer"));
        assert_eq!(snapshot.parent_element(outer), Some(snapshot.root()));
        assert_eq!(snapshot.parent_element(snapshot.root()), None);
    }

    #[test]
    fn test_element_children_and_text() {
        let snapshot = DomSnapshot::new(create_test_tree());

        let outer = snapshot.find_element("div", "projectid", "outer").unwrap();
        let children = snapshot.element_children(outer);
        assert_eq!(children.len(), 1);
        assert_eq!(snapshot.text_content(outer), "Outer inner");
        assert_eq!(snapshot.element_children(snapshot.root()).len(), 2);
    }

    #[test]
    fn test_has_class() {
        let root = ElementNode::new("div").with_class("children open");
        let snapshot = DomSnapshot::new(root);

        assert!(snapshot.has_class(snapshot.root(), "children"));
        assert!(!snapshot.has_class(snapshot.root(), "name"));
    }

    #[test]
    fn test_from_json() {
        let json = r##"[
            {"tag_name": "body", "parent": null},
            {"tag_name": "div", "attributes": {"projectid": "x"}, "parent": 0},
            {"tag_name": "#text", "text_content": "hi", "parent": 1},
            {"tag_name": "span", "parent": 0}
        ]"##;
        let snapshot = DomSnapshot::from_json(json).unwrap();

        let div = snapshot.find_element("div", "projectid", "x").unwrap();
        assert_eq!(snapshot.text_content(div), "hi");
        assert_eq!(snapshot.element_children(snapshot.root()).len(), 2);

        let err = DomSnapshot::from_json("not json").unwrap_err();
        assert!(matches!(err, BridgeError::SnapshotFailed(_)));
    }

    #[test]
    fn test_from_nodes_rejects_bad_parents() {
        let node = |tag: &str, parent: Option<usize>| FlatNode {
            tag_name: tag.to_string(),
            parent,
            ..Default::default()
        };

        assert!(DomSnapshot::from_nodes(vec![]).is_err());
        assert!(DomSnapshot::from_nodes(vec![node("body", Some(0))]).is_err());
        assert!(DomSnapshot::from_nodes(vec![node("body", None), node("div", None)]).is_err());
        assert!(DomSnapshot::from_nodes(vec![node("body", None), node("div", Some(1))]).is_err());
        assert!(DomSnapshot::from_nodes(vec![node("body", None), node("div", Some(5))]).is_err());
    }

    #[test]
    fn test_from_nodes_restores_document_order() {
        // Children of the first div listed after its sibling
        let json = r#"[
            {"tag_name": "body"},
            {"tag_name": "div", "attributes": {"projectid": "a"}, "parent": 0},
            {"tag_name": "div", "attributes": {"projectid": "b"}, "parent": 0},
            {"tag_name": "div", "attributes": {"projectid": "a1"}, "parent": 1}
        ]"#;
        let snapshot = DomSnapshot::from_json(json).unwrap();

        let order: Vec<_> = snapshot
            .to_nodes()
            .into_iter()
            .filter_map(|node| node.attributes.get("projectid").cloned())
            .collect();
        assert_eq!(order, vec!["a", "a1", "b"]);
    }

    #[test]
    fn test_from_nodes_drops_script_subtrees() {
        let json = r##"[
            {"tag_name": "body"},
            {"tag_name": "script", "parent": 0},
            {"tag_name": "#text", "text_content": "var x = 1;", "parent": 1},
            {"tag_name": "p", "parent": 0},
            {"tag_name": "#text", "text_content": "Content", "parent": 3}
        ]"##;
        let snapshot = DomSnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.text_content(snapshot.root()), "Content");
    }

    #[test]
    fn test_json_round_trip_keeps_structure() {
        let snapshot = DomSnapshot::new(create_test_tree());
        let restored = DomSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(restored.to_nodes(), snapshot.to_nodes());
    }

    #[test]
    fn test_deep_page_parses() {
        // Nesting far beyond what a nested JSON document could carry
        let mut nodes = vec![FlatNode {
            tag_name: "body".to_string(),
            ..Default::default()
        }];
        for depth in 0..1000 {
            nodes.push(FlatNode {
                tag_name: "div".to_string(),
                attributes: IndexMap::from([("projectid".to_string(), format!("n{}", depth))]),
                parent: Some(depth),
                ..Default::default()
            });
        }
        let json = serde_json::to_string(&nodes).unwrap();

        let snapshot = DomSnapshot::from_json(&json).unwrap();
        let deepest = snapshot.find_element("div", "projectid", "n999").unwrap();
        let parent = snapshot.parent_element(deepest).unwrap();
        assert_eq!(snapshot.attribute(parent, "projectid"), Some("n998"));
    }
}
