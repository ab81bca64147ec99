//! Listener registry and handler identity.
//!
//! Handlers are plain closures behind `Rc`; a UUID token gives each handler
//! the function-identity semantics removal needs (a clone of a handler can
//! be passed to `off` and still name the original registration). Dispatch
//! itself lives on [`Document`](crate::document::Document), which owns the
//! propagation path.

use crate::document::Document;
use crate::types::NodeId;
use ahash::AHashMap;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Event name [`Selection::ready`](crate::selection::Selection::ready)
/// binds to.
pub const CONTENT_LOADED: &str = "DOMContentLoaded";

/// Where in the propagation an invocation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    Capture,
    Target,
    Bubble,
}

/// A dispatched event, handed to every listener.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    pub phase: EventPhase,
}

/// Listener registration strategy, chosen once per document.
///
/// `Legacy` mirrors attach-style registration on old engines: the capture
/// flag is ignored for both registration and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventBinding {
    #[default]
    Standard,
    Legacy,
}

type Callback = Rc<dyn Fn(&Document, &Event)>;

/// Identity-carrying event handler. Clones share the identity.
#[derive(Clone)]
pub struct EventHandler {
    id: Uuid,
    callback: Callback,
}

impl EventHandler {
    pub fn new(callback: impl Fn(&Document, &Event) + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            callback: Rc::new(callback),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn invoke(&self, document: &Document, event: &Event) {
        (self.callback)(document, event);
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler").field("id", &self.id).finish()
    }
}

#[derive(Clone)]
struct ListenerEntry {
    handler: EventHandler,
    capture: bool,
}

/// Per-document listener table: (node, event type) to ordered listeners.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: AHashMap<(NodeId, String), Vec<ListenerEntry>>,
}

impl ListenerRegistry {
    /// Registers a listener. A duplicate (handler, capture) pair on the same
    /// node and event type collapses into the existing registration.
    pub(crate) fn add(&mut self, node: NodeId, event_type: &str, handler: &EventHandler, capture: bool) {
        let list = self.entries.entry((node, event_type.to_string())).or_default();
        if list
            .iter()
            .any(|entry| entry.handler.id == handler.id && entry.capture == capture)
        {
            return;
        }
        list.push(ListenerEntry {
            handler: handler.clone(),
            capture,
        });
    }

    pub(crate) fn remove(&mut self, node: NodeId, event_type: &str, handler: &EventHandler, capture: bool) {
        if let Some(list) = self.entries.get_mut(&(node, event_type.to_string())) {
            list.retain(|entry| !(entry.handler.id == handler.id && entry.capture == capture));
        }
    }

    /// Listeners on a node for one phase, in registration order. `None`
    /// selects every listener (target phase).
    pub(crate) fn phase_handlers(
        &self,
        node: NodeId,
        event_type: &str,
        capture: Option<bool>,
    ) -> Vec<EventHandler> {
        match self.entries.get(&(node, event_type.to_string())) {
            Some(list) => list
                .iter()
                .filter(|entry| capture.map_or(true, |c| entry.capture == c))
                .map(|entry| entry.handler.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.entries
            .get(&(node, event_type.to_string()))
            .map(|list| list.len())
            .unwrap_or(0)
    }
}
