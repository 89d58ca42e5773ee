//! Descriptor of an outbound request to a remote API.

use crate::http::Method;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteBody {
    /// Sent as-is.
    Raw(String),
    /// Serialized to JSON text before sending.
    Json(serde_json::Value),
}

impl RemoteBody {
    /// Build a structured body from any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(RemoteBody::Json(serde_json::to_value(value)?))
    }

    /// Text that goes on the wire.
    pub fn into_text(self) -> Result<String, serde_json::Error> {
        match self {
            RemoteBody::Raw(text) => Ok(text),
            RemoteBody::Json(value) => serde_json::to_string(&value),
        }
    }
}

impl From<String> for RemoteBody {
    fn from(text: String) -> Self {
        RemoteBody::Raw(text)
    }
}

impl From<&str> for RemoteBody {
    fn from(text: &str) -> Self {
        RemoteBody::Raw(text.to_string())
    }
}

impl From<serde_json::Value> for RemoteBody {
    fn from(value: serde_json::Value) -> Self {
        RemoteBody::Json(value)
    }
}

/// Everything needed to issue one request to a remote URL.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<RemoteBody>,
    pub params: Option<HashMap<String, String>>,
    pub headers: Option<HashMap<String, String>>,
    pub accept: Option<String>,
    /// Falls back to the configured remote timeout when unset.
    pub timeout: Option<Duration>,
}

impl RemoteRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            params: None,
            headers: None,
            accept: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn body(mut self, body: impl Into<RemoteBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
