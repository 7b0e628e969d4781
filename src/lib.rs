//! Fan-out demo service library.
//!
//! Each node answers an inbound request by calling its backends in parallel
//! and returning a JSON tree of their responses nested under its own.

pub mod aggregator;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use aggregator::{Aggregator, ServiceResponse};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
