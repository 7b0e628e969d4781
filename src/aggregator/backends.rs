//! Backend list resolution.
//!
//! The statically configured list is used unless the request carries a
//! non-empty `backends` header, which replaces it for that request only.

use axum::http::HeaderMap;

/// Per-request override of the backend list.
pub const BACKENDS_HEADER: &str = "backends";

/// Split a comma-delimited backend list.
///
/// A blank string is an empty list. Entries are trimmed; empty entries are
/// kept so they surface as failed calls instead of silently vanishing.
pub fn parse_backend_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|entry| entry.trim().to_string()).collect()
}

/// Resolve which backends to call for one request.
pub fn resolve_backends(static_backends: &[String], headers: &HeaderMap) -> Vec<String> {
    let override_list = headers
        .get(BACKENDS_HEADER)
        .and_then(|v| match v.to_str() {
            Ok(text) => Some(text),
            Err(_) => {
                tracing::debug!(value = ?v, "Ignoring backends header that is not visible ASCII");
                None
            }
        })
        .filter(|v| !v.trim().is_empty());

    match override_list {
        Some(raw) => parse_backend_list(raw),
        None => static_backends.to_vec(),
    }
}
