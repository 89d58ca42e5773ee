//! Inbound HTTP types and response formatting helpers.

pub mod format;
mod request;
mod response;

pub use format::{json_array, jsonp, FormatError};
pub use request::{Method, Request, UnsupportedMethod};
pub(crate) use request::parse_query;
pub use response::{Response, StatusCode};
