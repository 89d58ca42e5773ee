//! Two-step text decoding of JSON bodies.
//!
//! Charset sniffing is slow and rarely right for API responses, so bodies
//! are read as raw bytes and decoded as UTF-8, falling back to ISO-8859-1
//! when the bytes are not valid UTF-8.

use std::borrow::Cow;

/// Decode bytes as UTF-8, or as ISO-8859-1 when that fails.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            tracing::debug!("body is not UTF-8 ({}), decoding as ISO-8859-1", err);
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Parse a JSON document from raw body bytes.
pub fn parse_json_bytes(bytes: &[u8]) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(&decode_text(bytes))
}
