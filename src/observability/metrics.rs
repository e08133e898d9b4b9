//! # Metrics
//!
//! Prometheus metrics for monitoring the adapter.
//!
//! ## Metrics Exposed
//!
//! - `vm_extension_operations_total` - Lifecycle operations by operation
//! - `vm_extension_operation_errors_total` - Failed lifecycle operations by operation and error kind
//! - `vm_extension_operation_duration_seconds` - Duration of lifecycle operations
//! - `vm_extension_not_found_total` - Reads that found the extension gone
//! - `vm_extension_delete_errors_suppressed_total` - Remote delete failures that were logged and ignored

use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vm_extension_operations_total",
            "Total number of virtual machine extension lifecycle operations",
        ),
        &["operation"],
    )
    .expect("Failed to create OPERATIONS_TOTAL metric - this should never happen")
});

static OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vm_extension_operation_errors_total",
            "Total number of failed virtual machine extension lifecycle operations",
        ),
        &["operation", "kind"],
    )
    .expect("Failed to create OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vm_extension_operation_duration_seconds",
            "Duration of virtual machine extension lifecycle operations in seconds",
        )
        .buckets(vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0]),
        &["operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

static NOT_FOUND_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vm_extension_not_found_total",
        "Total number of reads that found the extension missing",
    )
    .expect("Failed to create NOT_FOUND_TOTAL metric - this should never happen")
});

static DELETE_ERRORS_SUPPRESSED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vm_extension_delete_errors_suppressed_total",
        "Total number of remote delete failures that were ignored",
    )
    .expect("Failed to create DELETE_ERRORS_SUPPRESSED_TOTAL metric - this should never happen")
});

/// Register all metrics with the crate registry
///
/// # Errors
///
/// Returns an error if a metric is registered twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(NOT_FOUND_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DELETE_ERRORS_SUPPRESSED_TOTAL.clone()))?;
    Ok(())
}

/// Render registered metrics in the Prometheus text exposition format
///
/// # Errors
///
/// Returns an error if encoding fails or the output is not valid UTF-8.
pub fn gather_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn record_operation(operation: &str, duration: f64) {
    OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}

pub fn increment_operation_errors(operation: &str, kind: &str) {
    OPERATION_ERRORS_TOTAL
        .with_label_values(&[operation, kind])
        .inc();
}

pub fn increment_not_found() {
    NOT_FOUND_TOTAL.inc();
}

pub fn increment_delete_errors_suppressed() {
    DELETE_ERRORS_SUPPRESSED_TOTAL.inc();
}
