//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirector_requests_total` (counter): forwarded calls by upstream, method, status
//! - `redirector_request_duration_seconds` (histogram): time until the response head
//!
//! Failed calls are recorded with the status the caller is shown.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one forwarded call.
pub fn record_forward(upstream: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "redirector_requests_total",
        "upstream" => upstream.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "redirector_request_duration_seconds",
        "upstream" => upstream.to_string(),
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
