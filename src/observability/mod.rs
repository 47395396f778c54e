//! Observability features: metrics and tracing.
//!
//! - **Metrics**: counters via `metrics-rs`
//! - **Tracing**: structured events and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `datapipe_elements_produced` | Counter | Elements returned by a pipeline |
//! | `datapipe_elements_dropped` | Counter | Elements discarded by filters |
//! | `datapipe_stage_failures` | Counter | Failed `next()` calls |
//! | `datapipe_checkpoints` | Counter | Positions recorded |
//!
//! Without an installed recorder every call is a no-op.
//!
//! ## Example
//!
//! ```rust,ignore
//! use datapipe::observability::init_metrics;
//!
//! // Describe metrics once at startup, then install an exporter
//! init_metrics();
//! ```

mod metrics;
mod tracing_support;

pub use metrics::{PipelineMetrics, dropped_counter, init_metrics};
pub use tracing_support::{
    TracingConfig, instrument_pipeline, span_pipeline, trace_checkpoint, trace_element,
    trace_error, trace_exhausted, trace_reset, trace_restore,
};
