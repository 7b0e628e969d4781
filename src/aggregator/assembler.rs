//! Final decision over the joined backend results.

use std::time::Duration;

use crate::aggregator::error::AggregateError;
use crate::aggregator::response::{millis, ServiceResponse};

/// Build this node's response from its children.
///
/// Any failed child fails the request; only the number of failed children is
/// reported and the partial tree is dropped.
pub fn assemble(
    identity: &str,
    children: Vec<ServiceResponse>,
    elapsed: Duration,
) -> Result<ServiceResponse, AggregateError> {
    let failed = children.iter().filter(|c| c.has_error()).count();
    if failed > 0 {
        for child in children.iter().filter(|c| c.has_error()) {
            tracing::warn!(backend = %child.name, error = %child.error, "Discarding failed subtree");
        }
        return Err(AggregateError::BackendsFailed(failed));
    }

    Ok(ServiceResponse {
        name: identity.to_string(),
        error: String::new(),
        message: format!("Hi from {}", identity),
        backend_responses: children,
        time_ms: millis(elapsed),
    })
}
