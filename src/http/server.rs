//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the aggregate and health handlers
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener and stop on the shutdown broadcast
//! - Map aggregation outcomes to HTTP responses

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::aggregator::{AggregateError, Aggregator, BackendClient, HyperBackendClient};
use crate::config::ServiceConfig;
use crate::health;
use crate::http::request::{make_span, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}

/// HTTP server for one service node.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server that calls backends over HTTP.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_client(config, Arc::new(HyperBackendClient::new()))
    }

    /// Create a server with a specific backend transport.
    pub fn with_client(config: ServiceConfig, client: Arc<dyn BackendClient>) -> Self {
        let state = AppState {
            aggregator: Aggregator::from_config(&config, client),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.health.path, any(health::ping))
            .route("/", any(aggregate_handler))
            .route("/{*path}", any(aggregate_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span::<Body>))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app_name = %self.config.app_name,
            backends = ?self.config.backends,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Consume the server, returning its router.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Aggregate handler: fan out, then answer with the tree or a failure.
async fn aggregate_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();

    match render(&state.aggregator, &headers).await {
        Ok(body) => {
            metrics::record_request(StatusCode::OK.as_u16(), start);
            tracing::debug!(response = %String::from_utf8_lossy(&body), "Aggregated response");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
        Err(e) => {
            let status = e.status();
            metrics::record_request(status.as_u16(), start);
            if status.is_server_error() {
                tracing::error!(error = %e, "Aggregation failed");
            } else {
                tracing::warn!(error = %e, "Rejected request");
            }
            e.into_response()
        }
    }
}

async fn render(aggregator: &Aggregator, headers: &HeaderMap) -> Result<Vec<u8>, AggregateError> {
    let tree = aggregator.aggregate(headers).await?;
    Ok(serde_json::to_vec(&tree)?)
}
