//! Chainable wrapper over an ordered set of nodes.
//!
//! Every mutating method walks the whole member list and returns the
//! wrapper for chaining; getters read only the first member and fail with
//! [`DomError::EmptySelection`] when there is none. The member list itself
//! never changes after construction, only the nodes do.

use crate::document::Document;
use crate::error::{DomError, Result};
use crate::events::{EventHandler, CONTENT_LOADED};
use crate::parser;
use crate::selector::{self, Selector};
use crate::serializer;
use crate::types::{NodeId, NodeType};

/// Content accepted by [`Selection::append`] and [`Selection::prepend`].
#[derive(Debug, Clone)]
pub enum Content {
    /// Markup, parsed and concatenated onto each member's inner markup.
    Markup(String),
    /// An existing node. Every member receives its own deep clone, so one
    /// node is never moved between multiple parents.
    Node(NodeId),
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Content::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Content::Markup(markup)
    }
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Content::Node(node)
    }
}

pub struct Selection<'d> {
    doc: &'d Document,
    nodes: Vec<NodeId>,
}

impl<'d> Selection<'d> {
    pub(crate) fn new(doc: &'d Document, nodes: Vec<NodeId>) -> Self {
        Self { doc, nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First member, the one getters read.
    pub fn first(&self) -> Result<NodeId> {
        self.nodes.first().copied().ok_or(DomError::EmptySelection)
    }

    /// Visits every member in order with `(node, index)`. No early exit.
    pub fn each(&self, mut visitor: impl FnMut(NodeId, usize)) -> &Self {
        for (index, &node) in self.nodes.iter().enumerate() {
            visitor(node, index);
        }
        self
    }

    /// Queries each member's subtree and concatenates the matches into a
    /// new selection. Members with overlapping subtrees can contribute the
    /// same node twice; duplicates are kept.
    pub fn find(&self, selector: &str) -> Result<Selection<'d>> {
        let parsed = Selector::parse(selector)?;
        let arena = self.doc.arena();
        let mut nodes = Vec::new();
        for &member in &self.nodes {
            nodes.extend(selector::query_all(&arena, member, &parsed)?);
        }
        tracing::trace!(selector, matches = nodes.len(), "find");
        drop(arena);
        Ok(Selection::new(self.doc, nodes))
    }

    /// Control value of the first member.
    pub fn value(&self) -> Result<String> {
        let first = self.first()?;
        Ok(self.doc.arena().get(first)?.value.clone())
    }

    /// Sets the control value on every member.
    pub fn set_value(&self, value: &str) -> &Self {
        let mut arena = self.doc.arena_mut();
        for &node in &self.nodes {
            if let Ok(node) = arena.get_mut(node) {
                node.value = value.to_string();
            }
        }
        self
    }

    /// Attribute of the first member; `None` when the attribute is absent.
    pub fn attribute(&self, name: &str) -> Result<Option<String>> {
        let first = self.first()?;
        Ok(self.doc.arena().get(first)?.attr(name).map(str::to_string))
    }

    /// Sets an attribute on every member.
    pub fn set_attribute(&self, name: &str, value: &str) -> &Self {
        let mut arena = self.doc.arena_mut();
        for &node in &self.nodes {
            if let Ok(node) = arena.get_mut(node) {
                node.set_attr(name, value);
            }
        }
        self
    }

    /// Inner markup of the first member.
    pub fn html(&self) -> Result<String> {
        let first = self.first()?;
        serializer::inner_html(&self.doc.arena(), first)
    }

    /// Replaces every member's children with the parsed markup.
    pub fn set_html(&self, markup: &str) -> Result<&Self> {
        let mut arena = self.doc.arena_mut();
        for &node in &self.nodes {
            arena.remove_children(node)?;
            parser::parse_into(&mut arena, markup, node)?;
        }
        Ok(self)
    }

    /// Appends content to every member: markup goes after the existing
    /// inner markup, a node is deep-cloned per member and becomes the last
    /// child.
    pub fn append(&self, content: impl Into<Content>) -> Result<&Self> {
        let mut arena = self.doc.arena_mut();
        match content.into() {
            Content::Markup(markup) => {
                for &node in &self.nodes {
                    parser::parse_into(&mut arena, &markup, node)?;
                }
            }
            Content::Node(source) => {
                for &node in &self.nodes {
                    let copy = arena.clone_subtree(source)?;
                    arena.append_child(node, copy)?;
                }
            }
        }
        Ok(self)
    }

    /// Mirror of [`append`](Self::append): markup lands before the existing
    /// inner markup, a node clone becomes the first child.
    pub fn prepend(&self, content: impl Into<Content>) -> Result<&Self> {
        let mut arena = self.doc.arena_mut();
        match content.into() {
            Content::Markup(markup) => {
                for &node in &self.nodes {
                    let fragment = arena.alloc(NodeType::Document, "#fragment");
                    parser::parse_into(&mut arena, &markup, fragment)?;
                    let parsed = arena.get(fragment)?.children_ids.clone();
                    for &child in parsed.iter().rev() {
                        arena.insert_first(node, child)?;
                    }
                }
            }
            Content::Node(source) => {
                for &node in &self.nodes {
                    let copy = arena.clone_subtree(source)?;
                    arena.insert_first(node, copy)?;
                }
            }
        }
        Ok(self)
    }

    /// Registers `handler` for `event_type` on every member. The capture
    /// flag is subject to the document's binding strategy.
    pub fn on(&self, event_type: &str, handler: &EventHandler, capture: bool) -> &Self {
        let capture = self.doc.effective_capture(capture);
        let mut registry = self.doc.listeners_mut();
        for &node in &self.nodes {
            registry.add(node, event_type, handler, capture);
        }
        self
    }

    /// Symmetric removal.
    pub fn off(&self, event_type: &str, handler: &EventHandler, capture: bool) -> &Self {
        let capture = self.doc.effective_capture(capture);
        let mut registry = self.doc.listeners_mut();
        for &node in &self.nodes {
            registry.remove(node, event_type, handler, capture);
        }
        self
    }

    /// Binds `handler` to the content-loaded event on every member.
    pub fn ready(&self, handler: &EventHandler) -> &Self {
        self.on(CONTENT_LOADED, handler, false)
    }

    /// Dispatches `event_type` at every member in order. Returns the total
    /// number of listener invocations.
    pub fn trigger(&self, event_type: &str) -> Result<usize> {
        let mut total = 0;
        for &node in &self.nodes {
            total += self.doc.dispatch(node, event_type)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Target};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn each_visits_in_order() {
        let doc = Document::parse("<p id=a></p><p id=b></p>").unwrap();
        let selection = doc.select("p").unwrap();
        let mut seen = Vec::new();
        selection.each(|node, index| seen.push((node, index)));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, 0);
        assert_eq!(seen[1].1, 1);
        assert_eq!(seen[0].0, selection.nodes()[0]);
    }

    #[test]
    fn find_concatenates_and_keeps_duplicates() {
        let doc = Document::parse("<div id=outer><div id=inner><span></span></div></div>").unwrap();
        let outer = doc.select("#outer").unwrap().first().unwrap();
        let inner = doc.select("#inner").unwrap().first().unwrap();

        // Overlapping members: the span sits in both subtrees.
        let both = doc.wrap(vec![outer, inner]).unwrap();
        let spans = both.find("span").unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans.nodes()[0], spans.nodes()[1]);
    }

    #[test]
    fn find_on_single_member_equals_scoped_query() {
        let doc = Document::parse("<div id=a><span></span></div><span></span>").unwrap();
        let div = doc.select("#a").unwrap();
        let via_find = div.find("span").unwrap();
        let via_scope = doc.wrap_within("span", div.first().unwrap()).unwrap();
        assert_eq!(via_find.nodes(), via_scope.nodes());
    }

    #[test]
    fn find_with_no_match_is_empty_not_error() {
        let doc = Document::parse("<p></p>").unwrap();
        let none = doc.select("p").unwrap().find("article").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn value_setter_hits_every_member_getter_reads_first() {
        let doc = Document::parse("<input id=a value=one><input id=b value=two>").unwrap();
        let inputs = doc.select("input").unwrap();
        assert_eq!(inputs.value().unwrap(), "one");

        inputs.set_value("three");
        for &node in inputs.nodes() {
            assert_eq!(doc.arena().get(node).unwrap().value, "three");
        }
        // The value property moved, the attribute did not.
        assert_eq!(inputs.attribute("value").unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn attribute_duality() {
        let doc = Document::parse("<p id=a></p><p id=b></p>").unwrap();
        let paragraphs = doc.select("p").unwrap();
        assert_eq!(paragraphs.attribute("id").unwrap().as_deref(), Some("a"));
        assert_eq!(paragraphs.attribute("missing").unwrap(), None);

        paragraphs.set_attribute("data-mark", "x");
        let marked = doc.select("[data-mark=x]").unwrap();
        assert_eq!(marked.len(), 2);
    }

    #[test]
    fn html_duality() {
        let doc = Document::parse("<div id=a><i>old</i></div><div id=b></div>").unwrap();
        let divs = doc.select("div").unwrap();
        assert_eq!(divs.html().unwrap(), "<i>old</i>");

        divs.set_html("<b>new</b>").unwrap();
        assert_eq!(divs.html().unwrap(), "<b>new</b>");
        let second = doc.wrap_within("b", divs.nodes()[1]).unwrap();
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn append_markup_concatenates() {
        let doc = Document::parse("<div>start</div>").unwrap();
        let div = doc.select("div").unwrap();
        let before = div.html().unwrap();
        div.append("X").unwrap();
        assert_eq!(div.html().unwrap(), format!("{before}X"));
    }

    #[test]
    fn prepend_markup_goes_first() {
        let doc = Document::parse("<div><span>tail</span></div>").unwrap();
        let div = doc.select("div").unwrap();
        div.prepend("<b>head</b>middle").unwrap();
        assert_eq!(div.html().unwrap(), "<b>head</b>middle<span>tail</span>");
    }

    #[test]
    fn append_node_clones_per_member() {
        let doc = Document::parse("<div id=a></div><div id=b></div>").unwrap();
        let badge = doc.create_element("em");
        doc.wrap(badge).unwrap().set_attribute("class", "badge");

        let divs = doc.select("div").unwrap();
        divs.append(badge).unwrap();

        let badges = doc.select("em.badge").unwrap();
        assert_eq!(badges.len(), 2);
        assert_ne!(badges.nodes()[0], badges.nodes()[1]);
        // The source stays detached; members hold independent clones.
        assert_ne!(badges.nodes()[0], badge);
        assert_eq!(doc.arena().get(badge).unwrap().parent_id, None);
    }

    #[test]
    fn prepend_node_becomes_first_child() {
        let doc = Document::parse("<div><span></span></div>").unwrap();
        let lead = doc.create_element("i");
        let div = doc.select("div").unwrap();
        div.prepend(lead).unwrap();
        assert_eq!(div.html().unwrap(), "<i></i><span></span>");
    }

    #[test]
    fn getters_on_empty_selection_fail() {
        let doc = Document::parse("<p></p>").unwrap();
        let none = doc.select("article").unwrap();
        assert!(none.is_empty());
        assert!(matches!(none.value(), Err(DomError::EmptySelection)));
        assert!(matches!(none.attribute("id"), Err(DomError::EmptySelection)));
        assert!(matches!(none.html(), Err(DomError::EmptySelection)));
    }

    #[test]
    fn setters_on_empty_selection_are_noops() {
        let doc = Document::parse("<p></p>").unwrap();
        let none = doc.select("article").unwrap();
        none.set_value("x").set_attribute("a", "b");
        none.set_html("<i></i>").unwrap();
    }

    #[test]
    fn chained_setters() {
        let doc = Document::parse("<input><input>").unwrap();
        doc.select("input")
            .unwrap()
            .set_value("v")
            .set_attribute("data-k", "1");
        let inputs = doc.select("input[data-k=1]").unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.value().unwrap(), "v");
    }

    #[test]
    fn on_trigger_off_cycle() {
        let doc = Document::parse("<button></button><button></button>").unwrap();
        let buttons = doc.select("button").unwrap();

        let hits = Rc::new(RefCell::new(0));
        let hits_in = Rc::clone(&hits);
        let handler = EventHandler::new(move |_, _| {
            *hits_in.borrow_mut() += 1;
        });

        buttons.on("click", &handler, false);
        assert_eq!(buttons.trigger("click").unwrap(), 2);
        assert_eq!(*hits.borrow(), 2);

        buttons.off("click", &handler, false);
        assert_eq!(buttons.trigger("click").unwrap(), 0);
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn ready_binds_content_loaded() {
        let doc = Document::parse("<body></body>").unwrap();
        let hits = Rc::new(RefCell::new(0));
        let hits_in = Rc::clone(&hits);
        doc.wrap(Target::Root)
            .unwrap()
            .ready(&EventHandler::new(move |_, _| {
                *hits_in.borrow_mut() += 1;
            }));
        doc.signal_ready().unwrap();
        assert_eq!(*hits.borrow(), 1);
    }
}
