//! Metrics collection and exposition.
//!
//! # Metrics
//! - `probe_cycles_total` (counter): probe cycles by target, outcome
//! - `probe_duration_seconds` (histogram): probe latency by target
//! - `gate_invocations_total` (counter): gate decisions by check, active, impacted
//! - `gate_processing_seconds` (histogram): oracle latency by check
//! - `gate_errors_total` (counter): failed invocations by check, kind

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::gate::{GateError, GateResponse};
use crate::prober::ProbeResult;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_probe(result: &ProbeResult) {
    let target = result.target.to_string();
    metrics::counter!(
        "probe_cycles_total",
        "target" => target.clone(),
        "outcome" => result.outcome.label()
    )
    .increment(1);
    metrics::histogram!("probe_duration_seconds", "target" => target)
        .record(result.duration.as_secs_f64());
}

pub fn record_gate(check: &str, response: &GateResponse, elapsed: Duration) {
    metrics::counter!(
        "gate_invocations_total",
        "check" => check.to_string(),
        "active" => bool_label(response.active),
        "impacted" => bool_label(response.impacted)
    )
    .increment(1);
    metrics::histogram!("gate_processing_seconds", "check" => check.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_gate_error(check: &str, error: &GateError) {
    metrics::counter!(
        "gate_errors_total",
        "check" => check.to_string(),
        "kind" => error.kind()
    )
    .increment(1);
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
