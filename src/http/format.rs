//! JSON and JSONP response helpers.

use crate::http::{Request, Response};
use hyper::header::HeaderValue;
use serde::Serialize;
use thiserror::Error;

/// Query parameter naming the JSONP callback function.
pub const CALLBACK_PARAM: &str = "callback";

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("missing required key: {0}")]
    MissingKey(&'static str),
    #[error("failed to serialize response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wrap `data` in a call to the function named by the `callback` query
/// parameter, served as `application/javascript`.
///
/// The callback name is echoed verbatim.
pub fn jsonp<T: Serialize + ?Sized>(request: &Request, data: &T) -> Result<Response, FormatError> {
    let callback = request
        .get_query(CALLBACK_PARAM)
        .ok_or(FormatError::MissingKey(CALLBACK_PARAM))?;
    let data = serde_json::to_string(data)?;

    Ok(Response::with_body(
        HeaderValue::from_static("application/javascript"),
        format!("{}({})", callback, data),
    ))
}

/// Serialize a sequence as a JSON array served as `application/json`.
pub fn json_array<T: Serialize>(items: &[T]) -> Result<Response, FormatError> {
    Ok(Response::json(items)?)
}
