//! Stateless companions to the document crate: query-string encoding,
//! literal template substitution and a one-shot HTTP helper.
//!
//! Nothing here shares state with a document tree; the two crates compose
//! only at the API surface.

pub mod encode;
pub mod error;
pub mod request;
pub mod template;

pub use encode::encode_query;
pub use error::{NetError, Result};
pub use request::{Body, Method, Request, ResponseKind};
pub use template::{render_template, Template};
