//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fetch_attempts_total` (counter): producer invocations
//! - `fetch_retries_scheduled_total` (counter): retries scheduled after a failure
//! - `fetch_outcomes_total` (counter): settled and discarded attempts by `outcome`
//! - `fetch_attempt_duration_seconds` (histogram): producer latency
//! - `fetch_retry_delay_seconds` (histogram): scheduled backoff delays
//! - `debounce_published_total` (counter): values published by debouncers
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus endpoint is opt-in via configuration

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Final disposition of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    /// Result arrived for a superseded generation or after disposal.
    Discarded,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Discarded => "discarded",
        }
    }
}

/// Install the Prometheus exporter on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_attempt() {
    counter!("fetch_attempts_total").increment(1);
}

pub fn record_attempt_duration(elapsed: Duration) {
    histogram!("fetch_attempt_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_retry_scheduled(delay: Duration) {
    counter!("fetch_retries_scheduled_total").increment(1);
    histogram!("fetch_retry_delay_seconds").record(delay.as_secs_f64());
}

pub fn record_outcome(outcome: Outcome) {
    counter!("fetch_outcomes_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_debounce_published() {
    counter!("debounce_published_total").increment(1);
}
