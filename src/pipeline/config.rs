//! Pipeline configuration.

use crate::observability::TracingConfig;

/// Configuration for a [`Pipeline`](super::Pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Name used in logs, metrics labels and error attribution.
    pub name: String,

    /// Record the pipeline shape at the head of every checkpoint and
    /// verify it on restore.
    pub check_shape: bool,

    /// Record `metrics` counters.
    pub metrics: bool,

    /// Span and event settings.
    pub tracing: TracingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "pipeline".to_string(),
            check_shape: true,
            metrics: true,
            tracing: TracingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration under a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// No shape tag, metrics or tracing.
    ///
    /// Checkpoints hold only stage fields, which keeps them compatible with
    /// tapes recorded directly through [`Stage::record_position`](crate::stage::Stage::record_position).
    pub fn bare() -> Self {
        Self {
            name: "pipeline".to_string(),
            check_shape: false,
            metrics: false,
            tracing: TracingConfig::none(),
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable the checkpoint shape tag.
    pub fn with_shape_check(mut self, enabled: bool) -> Self {
        self.check_shape = enabled;
        self
    }

    /// Enable or disable metrics.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Set the tracing configuration.
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.name, "pipeline");
        assert!(config.check_shape);
        assert!(config.metrics);
    }

    #[test]
    fn test_bare_config() {
        let config = PipelineConfig::bare().with_name("eval");
        assert_eq!(config.name, "eval");
        assert!(!config.check_shape);
        assert!(!config.metrics);
        assert_eq!(config.tracing, TracingConfig::none());
    }

    #[test]
    fn test_named_keeps_defaults() {
        let config = PipelineConfig::named("train").with_shape_check(false);
        assert_eq!(config.name, "train");
        assert!(!config.check_shape);
        assert!(config.metrics);
    }
}
