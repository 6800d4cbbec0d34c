//! Tree extraction module
//!
//! Turns the rendered part of an outline document into a tree of
//! [`NodeRecord`]s rooted at a requested node. Extraction is a pure read of a
//! [`Document`]; it never fails with `Err`, every problem is reported as an
//! [`ExtractionResult::Failure`].

pub mod layout;
pub mod record;

pub use layout::OutlineLayout;
pub use record::{
    ExtractedTree, ExtractionResult, NodeRecord, RootRecord, count_nodes, max_depth, render_outline,
};

use crate::dom::Document;
use crate::error::{BridgeError, Result};

/// Extracts node subtrees from documents rendered with an [`OutlineLayout`]
#[derive(Debug, Clone, Default)]
pub struct TreeExtractor {
    layout: OutlineLayout,
}

impl TreeExtractor {
    pub fn new(layout: OutlineLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &OutlineLayout {
        &self.layout
    }

    /// Extract the subtree rooted at `node_id`
    pub fn extract<D: Document>(&self, document: &D, node_id: &str) -> ExtractionResult {
        log::debug!("Extracting DOM tree for node {}", node_id);

        match self.try_extract(document, node_id) {
            Ok(tree) => {
                log::info!("Extracted {} nodes, depth {}", tree.node_count, tree.depth);
                log::debug!("Tree structure:\n{}", render_outline(&tree.children));
                ExtractionResult::Success(tree)
            }
            Err(err) => {
                log::warn!("Extraction for node {} failed: {}", node_id, err);
                err.into()
            }
        }
    }

    /// Extract the subtree rooted at `node_id`, surfacing failures as errors
    pub fn try_extract<D: Document>(&self, document: &D, node_id: &str) -> Result<ExtractedTree> {
        let root = document
            .find_element(&self.layout.node_tag, &self.layout.id_attribute, node_id)
            .ok_or_else(|| BridgeError::NodeNotFound(node_id.to_string()))?;

        let parent_id = document
            .parent_element(root)
            .and_then(|parent| self.closest_outline_node(document, parent))
            .and_then(|ancestor| document.attribute(ancestor, &self.layout.id_attribute))
            .map(str::to_string);

        let root_record = RootRecord {
            id: node_id.to_string(),
            name: self.node_name(document, root),
            note: self.node_note(document, root),
            parent_id,
        };

        let children = self.extract_children(document, root, 1)?;

        Ok(ExtractedTree::new(root_record, children))
    }

    fn extract_children<D: Document>(&self, document: &D, parent: D::Node, level: usize) -> Result<Vec<NodeRecord>> {
        if level > self.layout.max_depth {
            return Err(BridgeError::ExtractionFault(format!(
                "node nesting exceeds {} levels",
                self.layout.max_depth
            )));
        }

        let Some(container) = self.child_container(document, parent) else {
            return Ok(Vec::new());
        };

        let parent_id = document
            .attribute(parent, &self.layout.id_attribute)
            .map(str::to_string);

        document
            .element_children(container)
            .into_iter()
            .filter(|&child| self.is_outline_node(document, child))
            .map(|child| -> Result<NodeRecord> {
                let children = if self.has_rendered_children(document, child) {
                    self.extract_children(document, child, level + 1)?
                } else {
                    Vec::new()
                };

                Ok(NodeRecord {
                    id: document
                        .attribute(child, &self.layout.id_attribute)
                        .unwrap_or_default()
                        .to_string(),
                    name: self.node_name(document, child),
                    note: self.node_note(document, child),
                    parent_id: parent_id.clone(),
                    children,
                })
            })
            .collect()
    }

    fn is_outline_node<D: Document>(&self, document: &D, node: D::Node) -> bool {
        document.is_tag(node, &self.layout.node_tag)
            && document.attribute(node, &self.layout.id_attribute).is_some()
    }

    /// Nearest node element starting at `node` itself and walking up
    fn closest_outline_node<D: Document>(&self, document: &D, node: D::Node) -> Option<D::Node> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.is_outline_node(document, candidate) {
                return Some(candidate);
            }
            current = document.parent_element(candidate);
        }
        None
    }

    fn child_container<D: Document>(&self, document: &D, node: D::Node) -> Option<D::Node> {
        document
            .element_children(node)
            .into_iter()
            .find(|&child| document.has_class(child, &self.layout.children_class))
    }

    fn has_rendered_children<D: Document>(&self, document: &D, node: D::Node) -> bool {
        self.child_container(document, node)
            .is_some_and(|container| !document.element_children(container).is_empty())
    }

    fn node_name<D: Document>(&self, document: &D, node: D::Node) -> String {
        match find_by_class_path(document, node, &self.layout.name_path) {
            Some(region) => document.text_content(region).trim().to_string(),
            None => self.layout.untitled.clone(),
        }
    }

    fn node_note<D: Document>(&self, document: &D, node: D::Node) -> Option<String> {
        let region = find_by_class_path(document, node, &self.layout.note_path)?;
        let text = document.text_content(region);
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// First element in document order reached from `node` through direct
/// children carrying each class of `path` in turn
fn find_by_class_path<D: Document>(document: &D, node: D::Node, path: &[String]) -> Option<D::Node> {
    let Some((class, rest)) = path.split_first() else {
        return Some(node);
    };

    document
        .element_children(node)
        .into_iter()
        .filter(|&child| document.has_class(child, class))
        .find_map(|child| find_by_class_path(document, child, rest))
}
