//! Core node model for the document tree.
//!
//! Layout choices carried through the whole crate:
//! 1. u32 indices into the arena instead of pointers
//! 2. SmallVec for child lists and attributes (most nodes hold fewer than 4)
//! 3. Owned strings, since the tree outlives the parsed markup

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into the arena).
pub type NodeId = u32;

/// Node kinds the tree can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Doctype,
    Element,
    Text,
    Comment,
}

/// Elements that never have children and serialize without a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text: no nested markup, no character
/// references.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

/// A single node in the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Lowercase tag name for elements; `#document`, `#text`, `#comment`,
    /// `#doctype` markers otherwise.
    pub name: String,

    /// Text or comment content, the doctype body, or the element's control
    /// value. The control value is a node property, distinct from the
    /// `value` attribute.
    pub value: String,

    /// Attributes in source order. The first occurrence of a name wins.
    pub attributes: SmallVec<[(String, String); 4]>,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            name: name.into(),
            value: String::new(),
            attributes: SmallVec::new(),
        }
    }

    /// Tag name for element nodes.
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.name)
        } else {
            None
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Attribute value by name, first occurrence.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing the first existing occurrence.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Whitespace-separated membership test on the `class` attribute.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_first_occurrence_wins() {
        let mut node = DomNode::new(0, NodeType::Element, "div");
        node.attributes.push(("id".to_string(), "a".to_string()));
        node.attributes.push(("id".to_string(), "b".to_string()));
        assert_eq!(node.attr("id"), Some("a"));
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut node = DomNode::new(0, NodeType::Element, "div");
        node.set_attr("class", "x");
        node.set_attr("title", "t");
        node.set_attr("class", "y");
        assert_eq!(node.attr("class"), Some("y"));
        assert_eq!(node.attributes.len(), 2);
        assert_eq!(node.attributes[0].0, "class");
    }

    #[test]
    fn class_membership() {
        let mut node = DomNode::new(0, NodeType::Element, "div");
        node.set_attr("class", "row  highlight");
        assert!(node.has_class("row"));
        assert!(node.has_class("highlight"));
        assert!(!node.has_class("high"));
    }

    #[test]
    fn element_category_helpers() {
        assert!(is_void_element("BR"));
        assert!(!is_void_element("div"));
        assert!(is_raw_text_element("script"));
        assert!(!is_raw_text_element("span"));
    }

    #[test]
    fn node_serializes_to_json() {
        let mut node = DomNode::new(3, NodeType::Element, "input");
        node.set_attr("type", "text");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["name"], "input");
        assert_eq!(json["node_type"], "Element");
        assert_eq!(json["attributes"][0][0], "type");
    }
}
