//! One-shot HTTP helper with success/error callbacks.
//!
//! The options record of the original surface maps onto a builder. There is
//! no timeout, no retry and no cancellation; completion is observable only
//! through the callbacks (or the awaited result).

use crate::encode::encode_query;
use crate::error::{NetError, Result};
use reqwest::header::CONTENT_TYPE;
use tokio::task::JoinHandle;
use url::Url;

pub use reqwest::Method;

/// How the response body is delivered to the success callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    #[default]
    Json,
    Text,
}

/// Response payload handed to the success callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    Text(String),
}

type SuccessHandler = Box<dyn FnOnce(Body) + Send>;
type ErrorHandler = Box<dyn FnOnce(u16) + Send>;

/// A single outgoing request.
///
/// A GET never carries a body, whatever data is attached. Any other method
/// sends the form-encoded data as the body of exactly one request.
pub struct Request {
    src: String,
    method: Method,
    data: Vec<(String, String)>,
    kind: ResponseKind,
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
}

impl Request {
    pub fn new(method: Method, src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            method,
            data: Vec::new(),
            kind: ResponseKind::default(),
            on_success: None,
            on_error: None,
        }
    }

    pub fn get(src: impl Into<String>) -> Self {
        Self::new(Method::GET, src)
    }

    pub fn post(src: impl Into<String>) -> Self {
        Self::new(Method::POST, src)
    }

    /// Appends one data pair. Pair order is preserved in the encoded body.
    pub fn data(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.data.push((key.into(), value.to_string()));
        self
    }

    pub fn response_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    /// Invoked with the response body on a 200 completion.
    pub fn on_success(mut self, callback: impl FnOnce(Body) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Invoked with the numeric status on any non-200 completion. Without
    /// this callback a non-200 completion surfaces as [`NetError::Status`].
    pub fn on_error(mut self, callback: impl FnOnce(u16) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Performs the request and delivers the outcome through the callbacks.
    pub async fn send(self) -> Result<()> {
        let url = Url::parse(&self.src)?;
        tracing::debug!(method = %self.method, url = %url, "dispatching request");

        let client = reqwest::Client::new();
        let mut builder = client.request(self.method.clone(), url);
        if self.method != Method::GET {
            builder = builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_query(&self.data));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        if status == 200 {
            let text = response.text().await?;
            let body = match self.kind {
                ResponseKind::Json => Body::Json(serde_json::from_str(&text)?),
                ResponseKind::Text => Body::Text(text),
            };
            if let Some(callback) = self.on_success {
                callback(body);
            }
            Ok(())
        } else {
            tracing::debug!(status, "request completed with non-200 status");
            match self.on_error {
                Some(callback) => {
                    callback(status);
                    Ok(())
                }
                None => Err(NetError::Status(status)),
            }
        }
    }

    /// Fire-and-forget: runs [`send`](Self::send) on a background task.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.send())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_data_in_order() {
        let request = Request::post("http://x.test/submit")
            .data("a", 1)
            .data("b", "two");
        assert_eq!(encode_query(&request.data), "a=1&b=two");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.kind, ResponseKind::Json);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_sending() {
        let result = Request::get("not a url").send().await;
        assert!(matches!(result, Err(NetError::InvalidUrl(_))));
    }
}
