//! Prometheus metrics for fleetdrop
//!
//! Defines metrics for:
//! - Upload attempts by mode and outcome
//! - Validation failures by kind
//! - Storage operation duration

use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Upload attempts by mode (csv, file) and outcome
    pub static ref UPLOADS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fleetdrop_uploads_total", "Upload attempts by mode and outcome"),
        &["mode", "outcome"]
    )
    .expect("Failed to create UPLOADS_TOTAL metric");

    /// Trip-file validation failures by kind
    pub static ref VALIDATION_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("fleetdrop_validation_failures_total", "Validation failures by kind"),
        &["kind"]
    )
    .expect("Failed to create VALIDATION_FAILURES metric");

    /// Storage operation duration histogram (probe and transfer)
    pub static ref STORAGE_OPERATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fleetdrop_storage_operation_duration_seconds",
            "Storage operation duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    )
    .expect("Failed to create STORAGE_OPERATION_DURATION metric");
}

/// Initialize metrics and register with the global registry
pub fn init_metrics() {
    REGISTRY.register(Box::new(UPLOADS_TOTAL.clone())).unwrap();
    REGISTRY.register(Box::new(VALIDATION_FAILURES.clone())).unwrap();
    REGISTRY.register(Box::new(STORAGE_OPERATION_DURATION.clone())).unwrap();
}
