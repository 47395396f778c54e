//! Metrics collection using metrics-rs.

use metrics::{Counter, Unit, counter};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether metrics have been described.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

const ELEMENTS_PRODUCED: &str = "datapipe_elements_produced";
const ELEMENTS_DROPPED: &str = "datapipe_elements_dropped";
const STAGE_FAILURES: &str = "datapipe_stage_failures";
const CHECKPOINTS: &str = "datapipe_checkpoints";

/// Initialize metrics descriptions.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(
        ELEMENTS_PRODUCED,
        Unit::Count,
        "Total number of elements returned by pipelines"
    );
    metrics::describe_counter!(
        ELEMENTS_DROPPED,
        Unit::Count,
        "Total number of elements discarded by filter stages"
    );
    metrics::describe_counter!(
        STAGE_FAILURES,
        Unit::Count,
        "Total number of failed next() calls"
    );
    metrics::describe_counter!(
        CHECKPOINTS,
        Unit::Count,
        "Total number of recorded pipeline positions"
    );
}

/// Counter of elements discarded by the filter stage named `stage`.
///
/// Register it once per stage and increment the handle on the hot path.
pub fn dropped_counter(stage: &str) -> Counter {
    counter!(ELEMENTS_DROPPED, "stage" => stage.to_string())
}

/// Counters for one pipeline, with the pipeline label pre-applied.
#[derive(Clone)]
pub struct PipelineMetrics {
    produced: Counter,
    failures: Counter,
    checkpoints: Counter,
}

impl PipelineMetrics {
    /// Create the counters for `pipeline`.
    pub fn new(pipeline: &str) -> Self {
        Self {
            produced: counter!(ELEMENTS_PRODUCED, "pipeline" => pipeline.to_string()),
            failures: counter!(STAGE_FAILURES, "pipeline" => pipeline.to_string()),
            checkpoints: counter!(CHECKPOINTS, "pipeline" => pipeline.to_string()),
        }
    }

    /// Counters that record nothing.
    pub fn noop() -> Self {
        Self {
            produced: Counter::noop(),
            failures: Counter::noop(),
            checkpoints: Counter::noop(),
        }
    }

    /// Record a returned element.
    #[inline]
    pub fn record_produced(&self) {
        self.produced.increment(1);
    }

    /// Record a failed `next()`.
    #[inline]
    pub fn record_failure(&self) {
        self.failures.increment(1);
    }

    /// Record a checkpoint.
    #[inline]
    pub fn record_checkpoint(&self) {
        self.checkpoints.increment(1);
    }
}

impl std::fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineMetrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_idempotent() {
        init_metrics();
        init_metrics();
        assert!(METRICS_INITIALIZED.load(Ordering::SeqCst));
    }

    #[test]
    fn test_recording_without_recorder() {
        // No recorder installed: these must not panic
        dropped_counter("filter").increment(1);

        let metrics = PipelineMetrics::new("test");
        metrics.record_produced();
        metrics.record_failure();
        metrics.record_checkpoint();

        PipelineMetrics::noop().record_produced();
    }
}
