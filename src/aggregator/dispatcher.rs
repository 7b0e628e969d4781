//! Concurrent fan-out to backends.
//!
//! One task per backend is spawned into a [`JoinSet`]. Each task carries its
//! slot index back through the join, so results land in resolution order no
//! matter which call finishes first. `dispatch` returns only once every task
//! has finished; there is no per-call timeout and no retry.

use axum::http::HeaderMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::aggregator::client::{BackendClient, BackendReply, CallError};
use crate::aggregator::response::{millis, ServiceResponse};
use crate::http::headers::propagate;
use crate::observability::metrics;

/// Fans a request out to a list of backends.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn BackendClient>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self { client }
    }

    /// Call every backend concurrently and collect one node per backend.
    pub async fn dispatch(&self, backends: &[String], inbound: &HeaderMap) -> Vec<ServiceResponse> {
        let headers = propagate(inbound);
        let mut tasks = JoinSet::new();

        for (idx, backend) in backends.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let backend = backend.clone();
            let headers = headers.clone();
            tasks.spawn(async move {
                let start = Instant::now();
                let result = client.get(&backend, headers).await;
                let node = classify(&backend, result, start.elapsed());
                (idx, node)
            });
        }

        let mut slots: Vec<Option<ServiceResponse>> = vec![None; backends.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, node)) => slots[idx] = Some(node),
                Err(e) => tracing::error!(error = %e, "Backend call task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(backends)
            .map(|(slot, backend)| {
                slot.unwrap_or_else(|| {
                    ServiceResponse::failed(
                        backend.as_str(),
                        format!("Call to {} did not complete", backend),
                        Duration::ZERO,
                    )
                })
            })
            .collect()
    }
}

/// Turn the outcome of one backend call into its tree node.
pub fn classify(
    backend: &str,
    result: Result<BackendReply, CallError>,
    elapsed: Duration,
) -> ServiceResponse {
    let reply = match result {
        Ok(reply) => reply,
        Err(e) => {
            let detail = e.describe();
            tracing::warn!(backend = %backend, error = %detail, "Backend call failed");
            metrics::record_backend_call("transport_error", elapsed);
            return ServiceResponse::failed(
                backend,
                format!("Error calling {}: {}", backend, detail),
                elapsed,
            );
        }
    };

    if !reply.status.is_success() {
        tracing::warn!(backend = %backend, status = %reply.status, "Backend returned non-success status");
        metrics::record_backend_call("status_error", elapsed);
        return ServiceResponse::failed(
            backend,
            format!(
                "Received response with {}({}) status from {}",
                reply.status.as_u16(),
                reply.status,
                backend
            ),
            elapsed,
        );
    }

    match serde_json::from_slice::<ServiceResponse>(&reply.body) {
        Ok(node) => {
            metrics::record_backend_call("ok", elapsed);
            node
        }
        Err(e) => {
            let content = String::from_utf8_lossy(&reply.body).into_owned();
            tracing::warn!(backend = %backend, error = %e, body = %content, "Backend body is not a service response");
            metrics::record_backend_call("parse_error", elapsed);
            ServiceResponse {
                name: backend.to_string(),
                error: format!("Error unmarshalling json from {}: {}", backend, e),
                message: content,
                backend_responses: Vec::new(),
                time_ms: millis(elapsed),
            }
        }
    }
}
