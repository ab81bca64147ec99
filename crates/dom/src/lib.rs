//! Arena-backed document tree with a chainable selection wrapper.
//!
//! The crate carries its own minimal substrate for everything the browser
//! platform would otherwise provide:
//!
//! - a forgiving HTML parser and a canonical serializer (the inner-markup
//!   duality)
//! - a CSS selector subset engine for scoped queries
//! - a synchronous listener registry with capture/target/bubble dispatch
//!
//! ## Core design
//!
//! ```text
//! markup → parser → DomArena (NodeId indices) → Selection (ordered ids)
//!                        ↑ shared through Document, single-threaded
//! ```
//!
//! Selections hold indices, never references into the tree; the arena owns
//! every node for the lifetime of the [`Document`].

pub mod arena;
pub mod document;
pub mod error;
pub mod events;
pub mod parser;
pub mod selection;
pub mod selector;
pub mod serializer;
pub mod types;

pub use arena::DomArena;
pub use document::{Document, Target};
pub use error::{DomError, Result};
pub use events::{Event, EventBinding, EventHandler, EventPhase, CONTENT_LOADED};
pub use selection::{Content, Selection};
pub use selector::Selector;
pub use types::{DomNode, NodeId, NodeType};
