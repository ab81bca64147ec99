//! Error types for tree and selection operations.
//!
//! Simple, flat hierarchy. Conditions the browser platform leaves
//! unspecified (reading from an empty selection) are explicit variants here.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("selection is empty")]
    EmptySelection,

    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),

    #[error("markup error: {0}")]
    Markup(String),
}
