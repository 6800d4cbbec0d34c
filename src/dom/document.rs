/// Read-only view of a rendered document.
///
/// This is the whole surface the tree extractor needs. Implementations only
/// have to answer structural queries over a document that does not change
/// while it is being walked; a [`DomSnapshot`](super::DomSnapshot) is the
/// in-crate implementation.
pub trait Document {
    /// Cheap handle to an element of this document
    type Node: Copy;

    /// First element in document order with the given tag (ASCII
    /// case-insensitive) whose `attribute` equals `value`
    fn find_element(&self, tag: &str, attribute: &str, value: &str) -> Option<Self::Node>;

    fn tag_name(&self, node: Self::Node) -> &str;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Parent element, `None` at the document root
    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Direct element children in document order (text nodes excluded)
    fn element_children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Concatenated text of all descendants, like DOM `textContent`
    fn text_content(&self, node: Self::Node) -> String;

    fn has_class(&self, node: Self::Node, class_name: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    fn is_tag(&self, node: Self::Node, tag: &str) -> bool {
        self.tag_name(node).eq_ignore_ascii_case(tag)
    }
}
