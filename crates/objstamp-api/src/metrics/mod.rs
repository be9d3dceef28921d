//! Prometheus metrics for Objstamp
//!
//! Recording goes through the `metrics` macros, which are no-ops until
//! [`MetricsRecorder::install`] has run. `/metrics` is only mounted when
//! metrics are enabled.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use objstamp_core::{Error, Result};
use std::sync::Arc;
use std::time::Instant;

/// Metric names
pub mod names {
    pub const NOTIFICATIONS_TOTAL: &str = "objstamp_notifications_total";
    pub const NOTIFICATION_DURATION_SECONDS: &str = "objstamp_notification_duration_seconds";

    pub const STORE_CALLS_TOTAL: &str = "objstamp_store_calls_total";
    pub const STORE_CALL_DURATION_SECONDS: &str = "objstamp_store_call_duration_seconds";

    pub const UPTIME_SECONDS: &str = "objstamp_uptime_seconds";
    pub const INFO: &str = "objstamp_info";
}

/// Metrics recorder
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
    start_time: Instant,
}

impl MetricsRecorder {
    /// Install the process-wide Prometheus recorder
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| Error::Config(format!("Failed to install Prometheus recorder: {}", e)))?;

        gauge!(names::INFO, "version" => objstamp_core::VERSION).set(1.0);

        Ok(Self {
            handle,
            start_time: Instant::now(),
        })
    }

    /// Get metrics output in Prometheus format
    pub fn render(&self) -> String {
        gauge!(names::UPTIME_SECONDS).set(self.start_time.elapsed().as_secs_f64());
        self.handle.render()
    }
}

/// Record one handled notification
pub fn record_notification(outcome: &'static str, status: u16, duration_secs: f64) {
    counter!(
        names::NOTIFICATIONS_TOTAL,
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(names::NOTIFICATION_DURATION_SECONDS, "outcome" => outcome).record(duration_secs);
}

/// Record one object store round-trip
pub fn record_store_call(op: &'static str, success: bool, duration_secs: f64) {
    counter!(
        names::STORE_CALLS_TOTAL,
        "op" => op,
        "status" => if success { "success" } else { "error" }
    )
    .increment(1);

    histogram!(names::STORE_CALL_DURATION_SECONDS, "op" => op).record(duration_secs);
}

/// Handler for /metrics endpoint
pub async fn metrics_handler(State(metrics): State<Arc<MetricsRecorder>>) -> impl IntoResponse {
    let output = metrics.render();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        output,
    )
}

/// Process-wide recorder shared by tests; the global recorder can only be set once
#[cfg(test)]
pub(crate) fn test_recorder() -> Arc<MetricsRecorder> {
    use std::sync::OnceLock;

    static RECORDER: OnceLock<Arc<MetricsRecorder>> = OnceLock::new();
    RECORDER
        .get_or_init(|| Arc::new(MetricsRecorder::install().unwrap()))
        .clone()
}
