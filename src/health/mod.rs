//! Liveness endpoint for orchestrators.
//!
//! Answers 200 with an empty body on any method. It does not look at
//! backends: a node is alive even when its children are not.

use axum::http::StatusCode;

/// Liveness probe handler.
pub async fn ping() -> StatusCode {
    StatusCode::OK
}
