//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fanout_requests_total` (counter): inbound requests by status
//! - `fanout_request_duration_seconds` (histogram): inbound latency
//! - `fanout_backend_calls_total` (counter): backend calls by outcome
//! - `fanout_backend_call_duration_seconds` (histogram): backend call latency
//!
//! Outcomes are `ok`, `transport_error`, `status_error` and `parse_error`.
//! Backend addresses are not used as labels since the override header lets
//! callers choose arbitrary ones.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one inbound request.
pub fn record_request(status: u16, start: Instant) {
    ::metrics::counter!("fanout_requests_total", "status" => status.to_string()).increment(1);
    ::metrics::histogram!("fanout_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one backend call.
pub fn record_backend_call(outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!("fanout_backend_calls_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("fanout_backend_call_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}
