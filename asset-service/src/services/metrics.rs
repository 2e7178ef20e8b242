//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| AppError::ConfigError(anyhow::anyhow!("metrics already initialized")))
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_asset_created(orientation: &str) {
    counter!("assets_created_total", "orientation" => orientation.to_string()).increment(1);
}

pub fn record_asset_deleted(matched: bool) {
    counter!("assets_deleted_total", "matched" => matched.to_string()).increment(1);
}

/// `outcome` is one of `success`, `rejected` or `failed`.
pub fn record_batch(outcome: &'static str, size: usize) {
    counter!("asset_batches_total", "outcome" => outcome).increment(1);
    histogram!("asset_batch_size", "outcome" => outcome).record(size as f64);
}

pub fn record_step_duration(step: &'static str, elapsed: Duration) {
    histogram!("asset_step_duration_seconds", "step" => step).record(elapsed.as_secs_f64());
}
