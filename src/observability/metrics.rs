//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relayer_withdrawals_total` (counter): finished withdrawals by outcome
//! - `relayer_withdrawal_stage_seconds` (histogram): time spent per stage
//! - `relayer_submissions_total` (counter): broadcasts by result
//! - `relayer_reimbursements_total` (counter): reimbursement attempts by outcome
//! - `relayer_rpc_health` (gauge): 1=healthy, 0=unhealthy
//! - `relayer_http_requests_total` (counter): API requests by route, status
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_withdrawal(outcome: &'static str) {
    metrics::counter!("relayer_withdrawals_total", "outcome" => outcome).increment(1);
}

pub fn record_stage(stage: &'static str, elapsed: Duration) {
    metrics::histogram!("relayer_withdrawal_stage_seconds", "stage" => stage)
        .record(elapsed.as_secs_f64());
}

pub fn record_submission(result: &'static str) {
    metrics::counter!("relayer_submissions_total", "result" => result).increment(1);
}

pub fn record_reimbursement(outcome: &'static str) {
    metrics::counter!("relayer_reimbursements_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    metrics::gauge!("relayer_rpc_health").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_request(route: String, status: u16) {
    metrics::counter!(
        "relayer_http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}
