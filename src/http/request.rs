//! Inbound HTTP request as seen by handlers.

use bytes::Bytes;
use std::collections::HashMap;

/// Methods the server accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Canonical upper-case name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method outside [`Method`], such as `PURGE` or `TRACE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMethod(pub String);

impl TryFrom<&hyper::Method> for Method {
    type Error = UnsupportedMethod;

    fn try_from(method: &hyper::Method) -> Result<Self, Self::Error> {
        Ok(match *method {
            hyper::Method::GET => Method::Get,
            hyper::Method::POST => Method::Post,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::PATCH => Method::Patch,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::OPTIONS => Method::Options,
            _ => return Err(UnsupportedMethod(method.as_str().to_string())),
        })
    }
}

/// Inbound HTTP request handed to a [`Handler`](crate::endpoint::Handler).
///
/// Header names are stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Decoded query string parameters. The last occurrence of a key wins.
    pub query: HashMap<String, String>,
    /// HTTP headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

impl Request {
    /// Create a request for `target`, which may carry a query string.
    pub fn new(method: Method, target: impl AsRef<str>) -> Self {
        let target = target.as_ref();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, HashMap::new()),
        };

        Self {
            method,
            path: path.to_string(),
            query,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Get a header value.
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// Get a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&String> {
        self.query.get(key)
    }

    /// Raw `Authorization` header, if the client sent one.
    pub fn authorization(&self) -> Option<&str> {
        self.get_header("authorization").map(String::as_str)
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}

/// Decode an `application/x-www-form-urlencoded` query string.
pub(crate) fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
