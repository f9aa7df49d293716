//! Prometheus metrics for the pairing service.
//!
//! Metrics are recorded through the `metrics` facade and are no-ops until
//! [`init_metrics`] installs the exporter.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sp_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::pairings_generated_total("engine");
//! metrics::pairing_duration_ms("engine", 182.0);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `route` is the matched route template, never the raw path.
pub fn http_requests_total(method: &str, route: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, route: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Pairing Metrics
// ============================================================================

/// Increment pairings generated, labelled by the path that produced them.
pub fn pairings_generated_total(source: &str) {
    metrics::counter!("pairings_generated_total",
        "source" => source.to_string()
    )
    .increment(1);
}

/// Increment failed pairing requests, labelled by failure kind.
pub fn pairing_failures_total(kind: &str) {
    metrics::counter!("pairing_failures_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record time spent generating one round.
pub fn pairing_duration_ms(source: &str, duration_ms: f64) {
    metrics::histogram!("pairing_duration_ms",
        "source" => source.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment rejected requests on protected routes.
pub fn auth_failures_total(reason: &str) {
    metrics::counter!("auth_failures_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}
