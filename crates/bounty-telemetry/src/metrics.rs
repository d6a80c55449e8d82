//! Prometheus metrics for the bounty lifecycle.
//!
//! All metrics follow the naming convention: `cbb_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::time::Instant;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LIFECYCLE METRICS
    // =========================================================================

    /// Committed transitions by operation
    pub static ref LIFECYCLE_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("cbb_lifecycle_transitions_total", "Committed lifecycle transitions"),
        &["operation"]
    ).expect("metric creation failed");

    /// Rejected operations by operation and error kind
    pub static ref LIFECYCLE_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("cbb_lifecycle_rejections_total", "Rejected lifecycle operations"),
        &["operation", "kind"]
    ).expect("metric creation failed");

    /// Submission verdicts
    pub static ref VERIFICATIONS: CounterVec = CounterVec::new(
        Opts::new("cbb_lifecycle_verifications_total", "Submission verdicts recorded"),
        &["verdict"]  // verdict: pass/fail
    ).expect("metric creation failed");

    /// Bounties currently accepting applications
    pub static ref ACTIVE_BOUNTIES: Gauge = Gauge::new(
        "cbb_lifecycle_active_bounties",
        "Number of bounties in the Active state"
    ).expect("metric creation failed");

    /// Operation latency, lock acquisition included
    pub static ref OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "cbb_lifecycle_operation_duration_seconds",
            "Time spent executing lifecycle operations"
        ).buckets(exponential_buckets(0.000_01, 2.0, 16).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT METRICS
    // =========================================================================

    /// Events handed to the notification sink
    pub static ref EVENTS_EMITTED: Counter = Counter::new(
        "cbb_events_emitted_total",
        "Total lifecycle events emitted"
    ).expect("metric creation failed");

    /// Events the sink failed to deliver
    pub static ref EVENT_SINK_FAILURES: Counter = Counter::new(
        "cbb_events_sink_failures_total",
        "Lifecycle events the notification sink rejected"
    ).expect("metric creation failed");
}

/// Handle proving the metrics have been registered.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors registered by this call.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless; collectors that are already
/// registered are skipped.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a collector conflicts with a
/// differently shaped metric of the same name.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LIFECYCLE_TRANSITIONS.clone()),
        Box::new(LIFECYCLE_REJECTIONS.clone()),
        Box::new(VERIFICATIONS.clone()),
        Box::new(ACTIVE_BOUNTIES.clone()),
        Box::new(OPERATION_DURATION.clone()),
        Box::new(EVENTS_EMITTED.clone()),
        Box::new(EVENT_SINK_FAILURES.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if encoding fails.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record a committed transition.
pub fn record_transition(operation: &str) {
    LIFECYCLE_TRANSITIONS.with_label_values(&[operation]).inc();
}

/// Record a rejected operation.
pub fn record_rejection(operation: &str, kind: &str) {
    LIFECYCLE_REJECTIONS
        .with_label_values(&[operation, kind])
        .inc();
}

/// Record a submission verdict.
pub fn record_verdict(passed: bool) {
    let verdict = if passed { "pass" } else { "fail" };
    VERIFICATIONS.with_label_values(&[verdict]).inc();
}

/// Timer guard observing an operation's duration on drop.
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    /// Start timing `operation`.
    #[must_use]
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        OPERATION_DURATION
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());
    }
}
