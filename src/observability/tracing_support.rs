//! Tracing integration for structured logging and spans.

use tracing::{Level, Span, span};

/// Configuration for tracing behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Whether to create a span around each pipeline call.
    pub pipeline_spans: bool,
    /// Whether to emit an event for every produced element.
    pub element_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            pipeline_spans: true,
            element_events: false, // Can be expensive
        }
    }
}

impl TracingConfig {
    /// Everything enabled.
    pub fn all() -> Self {
        Self {
            pipeline_spans: true,
            element_events: true,
        }
    }

    /// Disable all spans and per-element events.
    pub fn none() -> Self {
        Self {
            pipeline_spans: false,
            element_events: false,
        }
    }
}

/// Create a span for a pipeline call.
///
/// # Example
///
/// ```rust,ignore
/// use datapipe::observability::span_pipeline;
///
/// let span = span_pipeline("train-data");
/// let _guard = span.enter();
/// ```
#[inline]
pub fn span_pipeline(name: &str) -> Span {
    span!(Level::DEBUG, "pipeline", name = %name)
}

/// Enter a pipeline span, returning the guard.
pub fn instrument_pipeline(name: &str) -> tracing::span::EnteredSpan {
    span_pipeline(name).entered()
}

/// Log an element leaving the pipeline.
#[inline]
pub fn trace_element(pipeline: &str, index: u64) {
    tracing::trace!(pipeline = %pipeline, index = index, "element produced");
}

/// Log exhaustion.
#[inline]
pub fn trace_exhausted(pipeline: &str, produced: u64) {
    tracing::debug!(pipeline = %pipeline, produced = produced, "pipeline exhausted");
}

/// Log a failed `next()`.
#[inline]
pub fn trace_error(pipeline: &str, stage: &str, error: &dyn std::error::Error) {
    tracing::error!(
        pipeline = %pipeline,
        stage = %stage,
        error = %error,
        "stage failed"
    );
}

/// Log a reset.
#[inline]
pub fn trace_reset(pipeline: &str) {
    tracing::debug!(pipeline = %pipeline, "pipeline reset");
}

/// Log a recorded checkpoint.
#[inline]
pub fn trace_checkpoint(pipeline: &str, shape: &str, fields: usize) {
    tracing::debug!(
        pipeline = %pipeline,
        shape = %shape,
        fields = fields,
        "position recorded"
    );
}

/// Log a restored checkpoint.
#[inline]
pub fn trace_restore(pipeline: &str, shape: &str, fields: usize) {
    tracing::debug!(
        pipeline = %pipeline,
        shape = %shape,
        fields = fields,
        "position reloaded"
    );
}
