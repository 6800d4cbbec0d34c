use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tag name used for text nodes in a snapshot
pub const TEXT_NODE_TAG: &str = "#text";

/// Whether a subtree with this tag is left out of snapshots (script, style, noscript)
pub fn is_pruned_tag(tag: &str) -> bool {
    ["script", "style", "noscript"]
        .iter()
        .any(|pruned| tag.eq_ignore_ascii_case(pruned))
}

/// Represents a captured DOM node (element or text)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "span"), or `#text` for text nodes
    pub tag_name: String,

    /// Element attributes in source order (e.g., projectid, class)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    /// Character data, only set on text nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Create a new element node
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag_name: TEXT_NODE_TAG.to_string(),
            text_content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Builder method: set a single attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set the class attribute
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attribute("class", class)
    }

    /// Builder method: append a text node child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(ElementNode::text(text));
        self
    }

    /// Builder method: append children
    pub fn with_children(mut self, children: impl IntoIterator<Item = ElementNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child node
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.get_attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    pub fn is_text(&self) -> bool {
        self.tag_name == TEXT_NODE_TAG
    }

    /// Direct element children, skipping text nodes
    pub fn element_children(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter(|c| !c.is_text())
    }

    /// Concatenated text of this node and all descendants, like DOM `textContent`
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text_content {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Remove script, style and noscript subtrees
    pub fn simplify(&mut self) {
        self.children.retain(|child| !is_pruned_tag(&child.tag_name));

        for child in &mut self.children {
            child.simplify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_creation() {
        let element = ElementNode::new("div")
            .with_attribute("projectid", "abc")
            .with_class("project open")
            .with_text("Hello");

        assert_eq!(element.tag_name, "div");
        assert_eq!(element.get_attribute("projectid"), Some("abc"));
        assert_eq!(element.children.len(), 1);
        assert!(element.children[0].is_text());
    }

    #[test]
    fn test_has_class() {
        let mut element = ElementNode::new("div");
        element.add_attribute("class", "name  content\tactive");

        assert!(element.has_class("name"));
        assert!(element.has_class("content"));
        assert!(element.has_class("active"));
        assert!(!element.has_class("hidden"));
        assert!(!ElementNode::new("div").has_class("name"));
    }

    #[test]
    fn test_is_tag_ignores_case() {
        let element = ElementNode::new("DIV");
        assert!(element.is_tag("div"));
        assert!(!element.is_tag("span"));
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let element = ElementNode::new("div")
            .with_text("Hello ")
            .with_children([ElementNode::new("b").with_text("big")])
            .with_text(" world");

        assert_eq!(element.text_content(), "Hello big world");
    }

    #[test]
    fn test_element_children_skip_text() {
        let element = ElementNode::new("div")
            .with_text("  ")
            .with_children([ElementNode::new("span"), ElementNode::new("p")]);

        let tags: Vec<_> = element.element_children().map(|c| c.tag_name.as_str()).collect();
        assert_eq!(tags, vec!["span", "p"]);
    }

    #[test]
    fn test_simplify() {
        let mut parent = ElementNode::new("div");
        parent.add_child(ElementNode::new("p").with_text("Content"));
        parent.add_child(ElementNode::new("script").with_text("alert('test')"));
        parent.add_child(ElementNode::new("STYLE").with_text(".test { color: red; }"));
        parent.add_child(ElementNode::new("span").with_text("More content"));

        parent.simplify();

        let tags: Vec<_> = parent.element_children().map(|c| c.tag_name.as_str()).collect();
        assert_eq!(tags, vec!["p", "span"]);
        assert_eq!(parent.text_content(), "ContentMore content");
    }

    #[test]
    fn test_is_pruned_tag() {
        assert!(is_pruned_tag("script"));
        assert!(is_pruned_tag("NOSCRIPT"));
        assert!(!is_pruned_tag("div"));
        assert!(!is_pruned_tag(TEXT_NODE_TAG));
    }

    #[test]
    fn test_deserialize_snapshot_json() {
        let json = r##"{
            "tag_name": "div",
            "attributes": {"projectid": "a1", "class": "project"},
            "children": [{"tag_name": "#text", "text_content": "hi"}]
        }"##;

        let node: ElementNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.get_attribute("projectid"), Some("a1"));
        assert_eq!(node.text_content(), "hi");
        assert_eq!(node.element_children().count(), 0);
    }
}
