//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the daemon:
//! - HTTP request metrics (latency, counts)
//! - Last run gauges
//! - Every core metric (pipeline, classification, uploads)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "kinoscout_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("kinoscout_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

// =============================================================================
// Run Metrics
// =============================================================================

/// Unix timestamp of the last finished run.
pub static LAST_RUN_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "kinoscout_last_run_timestamp_seconds",
        "Unix timestamp of the last finished run",
    )
    .unwrap()
});

/// Releases matched by the last finished run.
pub static LAST_RUN_MATCHED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "kinoscout_last_run_matched",
        "Releases matched by the last finished run",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();

    // Runs
    registry
        .register(Box::new(LAST_RUN_TIMESTAMP.clone()))
        .unwrap();
    registry
        .register(Box::new(LAST_RUN_MATCHED.clone()))
        .unwrap();

    // Core
    for collector in kinoscout_core::metrics::all_metrics() {
        registry.register(collector).unwrap();
    }
}

/// Encode all metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
