use crate::dom::ElementNode;
use serde::{Deserialize, Serialize};

/// Class/attribute convention the host outline page renders its nodes with.
///
/// Defaults describe Workflowy's markup:
///
/// ```text
/// div[projectid]
/// ├── .name  > .content > .innerContentContainer   (primary text)
/// ├── .notes > .content > .innerContentContainer   (secondary text)
/// └── .children                                     (rendered child nodes)
///     └── div[projectid] ...
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlineLayout {
    /// Tag of node elements
    pub node_tag: String,

    /// Attribute carrying the node identifier
    pub id_attribute: String,

    /// Class chain (direct children) from a node to its primary text region
    pub name_path: Vec<String>,

    /// Class chain (direct children) from a node to its secondary text region
    pub note_path: Vec<String>,

    /// Class of the direct child-container region
    pub children_class: String,

    /// Name reported when the primary text region is absent
    pub untitled: String,

    /// Deepest nesting the extractor walks before reporting a fault
    pub max_depth: usize,
}

impl Default for OutlineLayout {
    fn default() -> Self {
        Self {
            node_tag: "div".to_string(),
            id_attribute: "projectid".to_string(),
            name_path: vec!["name".into(), "content".into(), "innerContentContainer".into()],
            note_path: vec!["notes".into(), "content".into(), "innerContentContainer".into()],
            children_class: "children".to_string(),
            untitled: "Untitled".to_string(),
            max_depth: 512,
        }
    }
}

impl OutlineLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_tag(mut self, tag: impl Into<String>) -> Self {
        self.node_tag = tag.into();
        self
    }

    pub fn id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = attribute.into();
        self
    }

    pub fn name_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn note_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.note_path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn children_class(mut self, class: impl Into<String>) -> Self {
        self.children_class = class.into();
        self
    }

    pub fn untitled(mut self, sentinel: impl Into<String>) -> Self {
        self.untitled = sentinel.into();
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Build a node element following this convention.
    ///
    /// `name`/`note` of `None` leave the region out entirely; `children` of
    /// `None` leaves out the child container (a collapsed node), while
    /// `Some(vec![])` renders an empty one.
    pub fn element(
        &self,
        id: &str,
        name: Option<&str>,
        note: Option<&str>,
        children: Option<Vec<ElementNode>>,
    ) -> ElementNode {
        let mut node = ElementNode::new(&self.node_tag)
            .with_attribute(&self.id_attribute, id)
            .with_class("project");

        if let Some(name) = name {
            node.add_child(Self::text_region(&self.name_path, name));
        }
        if let Some(note) = note {
            node.add_child(Self::text_region(&self.note_path, note));
        }
        if let Some(children) = children {
            node.add_child(
                ElementNode::new("div")
                    .with_class(&self.children_class)
                    .with_children(children),
            );
        }
        node
    }

    fn text_region(path: &[String], text: &str) -> ElementNode {
        path.iter()
            .rev()
            .fold(None, |inner: Option<ElementNode>, class| {
                let element = ElementNode::new("div").with_class(class);
                Some(match inner {
                    Some(inner) => element.with_children([inner]),
                    None => element.with_text(text),
                })
            })
            .unwrap_or_else(|| ElementNode::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = OutlineLayout::default();
        assert_eq!(layout.node_tag, "div");
        assert_eq!(layout.id_attribute, "projectid");
        assert_eq!(layout.name_path, vec!["name", "content", "innerContentContainer"]);
        assert_eq!(layout.note_path, vec!["notes", "content", "innerContentContainer"]);
        assert_eq!(layout.children_class, "children");
        assert_eq!(layout.untitled, "Untitled");
    }

    #[test]
    fn test_layout_builder() {
        let layout = OutlineLayout::new()
            .node_tag("li")
            .id_attribute("data-id")
            .name_path(["title"])
            .note_path(["description"])
            .children_class("kids")
            .untitled("(empty)")
            .max_depth(8);

        assert_eq!(layout.node_tag, "li");
        assert_eq!(layout.id_attribute, "data-id");
        assert_eq!(layout.name_path, vec!["title"]);
        assert_eq!(layout.note_path, vec!["description"]);
        assert_eq!(layout.children_class, "kids");
        assert_eq!(layout.untitled, "(empty)");
        assert_eq!(layout.max_depth, 8);
    }

    #[test]
    fn test_element_markup() {
        let layout = OutlineLayout::default();
        let node = layout.element("a1", Some("Title"), Some("Body"), Some(vec![]));

        assert_eq!(node.get_attribute("projectid"), Some("a1"));
        let regions: Vec<_> = node.element_children().collect();
        assert_eq!(regions.len(), 3);
        assert!(regions[0].has_class("name"));
        assert!(regions[1].has_class("notes"));
        assert!(regions[2].has_class("children"));

        let inner = regions[0]
            .element_children()
            .next()
            .and_then(|content| content.element_children().next())
            .unwrap();
        assert!(inner.has_class("innerContentContainer"));
        assert_eq!(inner.text_content(), "Title");
    }

    #[test]
    fn test_element_collapsed_has_no_container() {
        let layout = OutlineLayout::default();
        let node = layout.element("a1", None, None, None);
        assert_eq!(node.element_children().count(), 0);
    }
}
