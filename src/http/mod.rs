//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, middleware)
//!     → request.rs (assign x-request-id, request span)
//!     → aggregator (fan-out, see crate::aggregator)
//!         → headers.rs (inbound headers copied to every backend call)
//!     → JSON tree or plain-text failure to client
//! ```

pub mod headers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
