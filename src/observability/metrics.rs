//! Metrics collection and exposition.
//!
//! # Metrics
//! - `timeout_guard_fallbacks_total` (counter): fallbacks written, by status
//! - `timeout_guard_suppressed_writes_total` (counter): writes dropped after
//!   timeout, by operation
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Prometheus exposition is opt-in via config

use std::net::SocketAddr;

use axum::http::StatusCode;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a fallback response written by the timer.
pub fn record_fallback(status: StatusCode) {
    ::metrics::counter!(
        "timeout_guard_fallbacks_total",
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

/// Record a write suppressed after timeout.
pub fn record_suppressed(operation: &'static str) {
    ::metrics::counter!(
        "timeout_guard_suppressed_writes_total",
        "operation" => operation
    )
    .increment(1);
}
