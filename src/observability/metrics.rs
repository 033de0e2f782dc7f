//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_server_requests_total` (counter): by method, route, status
//! - `route_server_request_duration_seconds` (histogram): handler latency
//! - `route_server_denied_total` (counter): requests refused by the auth gate

use std::net::SocketAddr;
use std::time::Instant;

use metrics::Label;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record a dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("route", route.to_string()),
        Label::new("status", status.to_string()),
    ];
    metrics::counter!("route_server_requests_total", labels.clone()).increment(1);
    metrics::histogram!("route_server_request_duration_seconds", labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a request refused by the auth gate.
pub fn record_denied(method: &str) {
    metrics::counter!("route_server_denied_total", "method" => method.to_string()).increment(1);
}
