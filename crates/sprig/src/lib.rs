//! Chainable DOM manipulation for parsed documents, with stateless
//! net/template companions.
//!
//! The two underlying crates stay independent; this facade composes them
//! into one namespace and adds the free [`wrap`] constructor.
//!
//! ```
//! let doc = sprig::Document::parse("<ul><li>a</li><li>b</li></ul>").unwrap();
//! let items = sprig::wrap(&doc, "li").unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(items.html().unwrap(), "a");
//! ```

pub use sprig_dom::{
    Content, DomArena, DomError, DomNode, Document, Event, EventBinding, EventHandler, EventPhase,
    NodeId, NodeType, Selection, Selector, Target, CONTENT_LOADED,
};
pub use sprig_net::{encode_query, render_template, Body, Method, NetError, Request, ResponseKind, Template};

/// Builds a selection over `document` from any [`Target`] form: a selector
/// string, a single node, an explicit node list, or [`Target::Root`] for
/// the document itself.
pub fn wrap<'d>(
    document: &'d Document,
    target: impl Into<Target>,
) -> sprig_dom::Result<Selection<'d>> {
    document.wrap(target)
}
