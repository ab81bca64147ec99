//! Error types for the request helper.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetError>;

#[derive(Debug, Error)]
pub enum NetError {
    /// Non-200 completion when no error callback was installed.
    #[error("request failed with status {0}")]
    Status(u16),

    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed response body: {0}")]
    ResponseParse(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
