//! Fan-out request aggregation.
//!
//! # Data Flow
//! ```text
//! inbound request headers
//!     → backends.rs (static list or `backends` override)
//!     → latency.rs (optional `latency` stall, 400 if malformed)
//!     → dispatcher.rs (one task per backend, headers propagated, join all)
//!     → assembler.rs (any failed child → "<N> backends failed")
//!     → ServiceResponse tree for this node
//! ```
//!
//! Backends are other instances of this same service, so the tree nests to
//! whatever depth the deployment wires up. Nothing survives between requests.

pub mod assembler;
pub mod backends;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod latency;
pub mod response;

pub use client::{BackendClient, HyperBackendClient};
pub use error::AggregateError;
pub use response::ServiceResponse;

use axum::http::HeaderMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::ServiceConfig;
use dispatcher::Dispatcher;

/// Handles one inbound request end to end.
#[derive(Clone)]
pub struct Aggregator {
    identity: Arc<str>,
    static_backends: Arc<[String]>,
    dispatcher: Dispatcher,
}

impl Aggregator {
    pub fn new(
        identity: impl Into<String>,
        static_backends: Vec<String>,
        client: Arc<dyn BackendClient>,
    ) -> Self {
        let identity: String = identity.into();
        Self {
            identity: Arc::from(identity),
            static_backends: Arc::from(static_backends),
            dispatcher: Dispatcher::new(client),
        }
    }

    /// Build an aggregator from resolved configuration.
    pub fn from_config(config: &ServiceConfig, client: Arc<dyn BackendClient>) -> Self {
        Self::new(config.app_name.clone(), config.backends.clone(), client)
    }

    /// This node's identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Resolve, stall, fan out, and assemble this node's response.
    pub async fn aggregate(&self, headers: &HeaderMap) -> Result<ServiceResponse, AggregateError> {
        let start = Instant::now();
        let backends = backends::resolve_backends(&self.static_backends, headers);

        if let Some(delay) = latency::from_headers(headers)? {
            tracing::debug!(delay = ?delay, "Injecting latency");
            tokio::time::sleep(delay).await;
        }

        tracing::debug!(backends = ?backends, "Fanning out");
        let children = self.dispatcher.dispatch(&backends, headers).await;

        assembler::assemble(&self.identity, children, start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::client::{BackendReply, CallError};
    use axum::body::Bytes;
    use axum::http::{HeaderValue, StatusCode};
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Every backend answers as a leaf named after its address.
    #[derive(Default)]
    struct EchoClient {
        calls: AtomicUsize,
    }

    impl BackendClient for EchoClient {
        fn get(
            &self,
            backend: &str,
            _headers: HeaderMap,
        ) -> BoxFuture<'static, Result<BackendReply, CallError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = serde_json::to_vec(&ServiceResponse {
                name: backend.to_string(),
                time_ms: 1,
                ..Default::default()
            })
            .unwrap();
            Box::pin(async move {
                Ok(BackendReply {
                    status: StatusCode::OK,
                    body: Bytes::from(body),
                })
            })
        }
    }

    struct PanickingClient;

    impl BackendClient for PanickingClient {
        fn get(
            &self,
            _backend: &str,
            _headers: HeaderMap,
        ) -> BoxFuture<'static, Result<BackendReply, CallError>> {
            Box::pin(explode())
        }
    }

    async fn explode() -> Result<BackendReply, CallError> {
        panic!("boom")
    }

    fn aggregator(statics: &[&str]) -> (Aggregator, Arc<EchoClient>) {
        let client = Arc::new(EchoClient::default());
        let statics = statics.iter().map(|s| s.to_string()).collect();
        (Aggregator::new("front", statics, client.clone()), client)
    }

    #[tokio::test]
    async fn leaf_response() {
        let (agg, client) = aggregator(&[]);
        let node = agg.aggregate(&HeaderMap::new()).await.unwrap();
        assert_eq!(node.name, "front");
        assert_eq!(node.message, "Hi from front");
        assert!(node.backend_responses.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn override_applies_to_one_request_only() {
        let (agg, _) = aggregator(&["color:8080"]);

        let mut headers = HeaderMap::new();
        headers.insert("backends", HeaderValue::from_static("x:1,y:2"));
        let node = agg.aggregate(&headers).await.unwrap();
        let names: Vec<_> = node.backend_responses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["x:1", "y:2"]);

        let node = agg.aggregate(&HeaderMap::new()).await.unwrap();
        let names: Vec<_> = node.backend_responses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["color:8080"]);
    }

    #[tokio::test]
    async fn malformed_latency_makes_no_calls() {
        let (agg, client) = aggregator(&["color:8080", "shape:8080"]);
        let mut headers = HeaderMap::new();
        headers.insert("latency", HeaderValue::from_static("fast"));

        let err = agg.aggregate(&headers).await.unwrap_err();
        assert!(matches!(err, AggregateError::InvalidLatency(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn latency_counts_toward_total_time() {
        let (agg, _) = aggregator(&[]);
        let mut headers = HeaderMap::new();
        headers.insert("latency", HeaderValue::from_static("30ms"));

        let start = Instant::now();
        let node = agg.aggregate(&headers).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(node.time_ms >= 30);
    }

    #[tokio::test]
    async fn panicked_calls_count_as_failures() {
        let statics = vec!["a:1".to_string(), "b:2".to_string()];
        let agg = Aggregator::new("front", statics, Arc::new(PanickingClient));

        let err = agg.aggregate(&HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, AggregateError::BackendsFailed(2)));
    }
}
