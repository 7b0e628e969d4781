//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and histograms via `metrics`)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for log shippers)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is set at the edge and rides along in propagated headers,
//!   so one id covers the whole call tree
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
