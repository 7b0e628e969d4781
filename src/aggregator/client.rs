//! Outbound HTTP transport for backend calls.
//!
//! The dispatcher only sees the [`BackendClient`] trait; the production
//! implementation wraps a pooled hyper-util client shared by every request.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

/// Status and fully buffered body of a backend response.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Transport-level failure of a backend call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The backend address does not form a valid `http://` URI.
    #[error("invalid backend address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: axum::http::Error,
    },

    /// Connecting, sending or receiving the response head failed.
    #[error("error making http call: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    /// The response body could not be read.
    #[error("error reading response: {0}")]
    Body(#[from] axum::Error),
}

impl CallError {
    /// Error text including every underlying cause.
    pub fn describe(&self) -> String {
        let mut text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !text.contains(&cause_text) {
                text.push_str(": ");
                text.push_str(&cause_text);
            }
            source = cause.source();
        }
        text
    }
}

/// Performs a single `GET http://<backend>` call.
pub trait BackendClient: Send + Sync + 'static {
    fn get(
        &self,
        backend: &str,
        headers: HeaderMap,
    ) -> BoxFuture<'static, Result<BackendReply, CallError>>;
}

/// Backend client over a pooled hyper connection manager.
#[derive(Clone)]
pub struct HyperBackendClient {
    client: Client<HttpConnector, Body>,
}

impl HyperBackendClient {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HyperBackendClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendClient for HyperBackendClient {
    fn get(
        &self,
        backend: &str,
        headers: HeaderMap,
    ) -> BoxFuture<'static, Result<BackendReply, CallError>> {
        let client = self.client.clone();
        let address = backend.to_string();

        Box::pin(async move {
            let mut request = Request::builder()
                .method(Method::GET)
                .uri(format!("http://{}", address))
                .body(Body::empty())
                .map_err(|source| CallError::InvalidAddress {
                    address: address.clone(),
                    source,
                })?;
            *request.headers_mut() = headers;

            let response: Response<hyper::body::Incoming> = client.request(request).await?;
            let status = response.status();
            let body = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX).await?;

            Ok(BackendReply { status, body })
        })
    }
}
