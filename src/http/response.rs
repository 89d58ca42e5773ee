//! Response built by handlers and rendered by the server.

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::HeaderMap;
use serde::Serialize;

pub use hyper::StatusCode;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Status, headers and a fully buffered body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Empty response with `status`.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// 200 with `body` labelled as `content_type`.
    pub fn with_body(content_type: HeaderValue, body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK)
            .header(CONTENT_TYPE, content_type)
            .body(body)
    }

    /// 200 with `data` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::with_body(HeaderValue::from_static(APPLICATION_JSON), serde_json::to_vec(data)?))
    }

    /// 200 with a plain-text body.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_body(HeaderValue::from_static(TEXT_PLAIN), content.into())
    }

    /// Plain-text error message with `status`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status)
            .header(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))
            .body(message.into())
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sets_content_type() {
        let response = Response::json(&serde_json::json!({"kind": "Native"})).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.text_body(), r#"{"kind":"Native"}"#);
    }

    #[test]
    fn error_keeps_status_and_message() {
        let response = Response::error(StatusCode::BAD_GATEWAY, "remote down");
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(response.text_body(), "remote down");
    }
}
