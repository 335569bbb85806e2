//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Film pipeline (outcomes per mode, searches, magnet lookups)
//! - Quality classification
//! - Run cycle (duration, uploads)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Film Pipeline Metrics
// =============================================================================

/// Films processed total by mode and outcome.
pub static FILMS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("kinoscout_films_processed_total", "Total films processed"),
        &["mode", "outcome"], // "fresh"/"recheck"; "matched", "no_releases", "no_magnet", ...
    )
    .unwrap()
});

/// Tracker search failures total.
pub static SEARCH_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "kinoscout_search_failures_total",
        "Total tracker searches that failed",
    )
    .unwrap()
});

/// Magnet lookup attempts total by result.
pub static MAGNET_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "kinoscout_magnet_attempts_total",
            "Total magnet link lookup attempts",
        ),
        &["result"], // "found", "missing", "error"
    )
    .unwrap()
});

/// Quality classifications total by recorded table.
pub static QUALITY_CLASSIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "kinoscout_quality_classifications_total",
            "Total quality classifications",
        ),
        &["table"], // "good", "bad", "none"
    )
    .unwrap()
});

// =============================================================================
// Run Cycle Metrics
// =============================================================================

/// Uploads total by catalog status.
pub static UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("kinoscout_uploads_total", "Total catalog uploads"),
        &["status"], // "uploaded", "duplicate", "rejected", "failed"
    )
    .unwrap()
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("kinoscout_run_duration_seconds", "Duration of one run cycle")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Films fetched from the catalog total.
pub static CATALOG_FILMS_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "kinoscout_catalog_films_fetched_total",
        "Total films fetched from the catalog",
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FILMS_PROCESSED.clone()),
        Box::new(SEARCH_FAILURES.clone()),
        Box::new(MAGNET_ATTEMPTS.clone()),
        Box::new(QUALITY_CLASSIFICATIONS.clone()),
        Box::new(UPLOADS.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(CATALOG_FILMS_FETCHED.clone()),
    ]
}
