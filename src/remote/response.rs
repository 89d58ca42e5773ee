//! Fully buffered response from a remote API.

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};

/// Status, headers and raw body of a remote answer.
///
/// Nothing is decoded up front; see [`RemoteResponse::decode_json`].
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    /// Case-insensitive header map.
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RemoteResponse {
    /// `Content-Type` header, if present and valid text.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether the remote labelled the body as JSON.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| ct.contains("json"))
            .unwrap_or(false)
    }

    /// Parse the body as JSON regardless of its content type.
    pub fn decode_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        super::decode::parse_json_bytes(&self.body)
    }
}
