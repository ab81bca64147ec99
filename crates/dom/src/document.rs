//! Document facade: owns the arena, the listener table and the binding
//! strategy behind single-threaded interior mutability.
//!
//! Everything else in the crate works through this type. Selections borrow
//! the document; the referenced nodes are shared with it, so mutations are
//! visible to every selection over the same tree.

use std::cell::{Ref, RefCell, RefMut};

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::events::{Event, EventBinding, EventHandler, EventPhase, ListenerRegistry, CONTENT_LOADED};
use crate::parser;
use crate::selection::Selection;
use crate::selector::{self, Selector};
use crate::serializer;
use crate::types::{NodeId, NodeType};

/// Construction target for [`Document::wrap`].
#[derive(Debug, Clone)]
pub enum Target {
    /// The document itself: a singleton selection over the document node.
    Root,
    /// A single existing node.
    Node(NodeId),
    /// An explicit node list, used verbatim.
    Nodes(Vec<NodeId>),
    /// A selector, queried from the document root.
    Selector(String),
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl From<Vec<NodeId>> for Target {
    fn from(nodes: Vec<NodeId>) -> Self {
        Target::Nodes(nodes)
    }
}

pub struct Document {
    arena: RefCell<DomArena>,
    listeners: RefCell<ListenerRegistry>,
    binding: EventBinding,
    root: NodeId,
}

impl Document {
    /// An empty document holding only the `#document` node.
    pub fn new() -> Self {
        let mut arena = DomArena::new();
        let root = arena.alloc(NodeType::Document, "#document");
        // A node just allocated into an empty arena always exists.
        let _ = arena.set_root(root);
        Self {
            arena: RefCell::new(arena),
            listeners: RefCell::new(ListenerRegistry::default()),
            binding: EventBinding::default(),
            root,
        }
    }

    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with_binding(html, EventBinding::default())
    }

    pub fn parse_with_binding(html: &str, binding: EventBinding) -> Result<Self> {
        let arena = parser::parse_document(html)?;
        let root = arena
            .root_id()
            .ok_or_else(|| DomError::Markup("document has no root".into()))?;
        Ok(Self {
            arena: RefCell::new(arena),
            listeners: RefCell::new(ListenerRegistry::default()),
            binding,
            root,
        })
    }

    pub fn binding(&self) -> EventBinding {
        self.binding
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Shared read access to the backing arena.
    ///
    /// The borrow must be released before any mutating call on the same
    /// document.
    pub fn arena(&self) -> Ref<'_, DomArena> {
        self.arena.borrow()
    }

    pub(crate) fn arena_mut(&self) -> RefMut<'_, DomArena> {
        self.arena.borrow_mut()
    }

    pub(crate) fn listeners_mut(&self) -> RefMut<'_, ListenerRegistry> {
        self.listeners.borrow_mut()
    }

    /// The capture flag a registration actually gets under the document's
    /// binding strategy.
    pub(crate) fn effective_capture(&self, capture: bool) -> bool {
        match self.binding {
            EventBinding::Standard => capture,
            EventBinding::Legacy => false,
        }
    }

    /// Selects every element under the document root matching `selector`.
    pub fn select(&self, selector: &str) -> Result<Selection<'_>> {
        self.wrap_within(selector, self.root)
    }

    /// Builds a selection from any [`Target`] form.
    pub fn wrap(&self, target: impl Into<Target>) -> Result<Selection<'_>> {
        match target.into() {
            Target::Root => Ok(Selection::new(self, vec![self.root])),
            Target::Node(node) => {
                self.arena.borrow().get(node)?;
                Ok(Selection::new(self, vec![node]))
            }
            Target::Nodes(nodes) => Ok(Selection::new(self, nodes)),
            Target::Selector(selector) => self.wrap_within(&selector, self.root),
        }
    }

    /// Selector query scoped to the subtree of `context`.
    pub fn wrap_within(&self, selector: &str, context: NodeId) -> Result<Selection<'_>> {
        let parsed = Selector::parse(selector)?;
        let arena = self.arena.borrow();
        let nodes = selector::query_all(&arena, context, &parsed)?;
        tracing::trace!(selector, matches = nodes.len(), "select");
        drop(arena);
        Ok(Selection::new(self, nodes))
    }

    /// Allocates a detached element, ready to be appended somewhere.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.arena
            .borrow_mut()
            .alloc(NodeType::Element, tag.to_ascii_lowercase())
    }

    /// Serialized markup of the whole document.
    pub fn outer_html(&self) -> Result<String> {
        serializer::outer_html(&self.arena.borrow(), self.root)
    }

    /// Dispatches an event at `target` with full propagation: capture
    /// listeners from the root down, target listeners in registration
    /// order, then bubble listeners back up. Returns the number of
    /// listener invocations.
    ///
    /// Listeners run after all internal borrows are released, so they may
    /// freely re-enter the document.
    pub fn dispatch(&self, target: NodeId, event_type: &str) -> Result<usize> {
        let path = {
            let arena = self.arena.borrow();
            arena.get(target)?;
            let mut ancestors = arena.ancestors(target)?;
            ancestors.reverse();
            ancestors
        };

        let mut plan: Vec<(EventHandler, NodeId, EventPhase)> = Vec::new();
        {
            let registry = self.listeners.borrow();
            for &node in &path {
                for handler in registry.phase_handlers(node, event_type, Some(true)) {
                    plan.push((handler, node, EventPhase::Capture));
                }
            }
            for handler in registry.phase_handlers(target, event_type, None) {
                plan.push((handler, target, EventPhase::Target));
            }
            for &node in path.iter().rev() {
                for handler in registry.phase_handlers(node, event_type, Some(false)) {
                    plan.push((handler, node, EventPhase::Bubble));
                }
            }
        }

        let invocations = plan.len();
        for (handler, current_target, phase) in plan {
            let event = Event {
                event_type: event_type.to_string(),
                target,
                current_target,
                phase,
            };
            handler.invoke(self, &event);
        }
        tracing::trace!(event_type, invocations, "dispatch");
        Ok(invocations)
    }

    /// Dispatches `DOMContentLoaded` at the document node.
    pub fn signal_ready(&self) -> Result<usize> {
        self.dispatch(self.root, CONTENT_LOADED)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
