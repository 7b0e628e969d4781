//! Request-level failures of the aggregator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::aggregator::latency::LatencyError;

/// Outcomes that fail the whole inbound request.
///
/// Per-backend failures are not listed here: they are recorded on the call
/// tree and only surface as [`AggregateError::BackendsFailed`].
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The `latency` header could not be parsed. No backend was called.
    #[error(transparent)]
    InvalidLatency(#[from] LatencyError),

    /// One or more backend calls failed.
    #[error("{0} backends failed")]
    BackendsFailed(usize),

    /// The assembled tree could not be encoded.
    #[error("failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AggregateError {
    pub fn status(&self) -> StatusCode {
        match self {
            AggregateError::InvalidLatency(_) => StatusCode::BAD_REQUEST,
            AggregateError::BackendsFailed(_) | AggregateError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AggregateError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
