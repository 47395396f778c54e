//! The pipeline handle handed to consumers.

use crate::error::{PipelineError, Result, TapeError};
use crate::observability::{
    PipelineMetrics, init_metrics, instrument_pipeline, trace_checkpoint, trace_element,
    trace_error, trace_exhausted, trace_reset, trace_restore,
};
use crate::stage::{BoxedStage, Stage};
use crate::tape::Tape;

use super::PipelineConfig;

const BROKEN: &str = "The data pipeline is broken by a previous error and must be reset before use.";

/// A composed stage chain plus the bookkeeping consumers need.
///
/// `Pipeline` adds three things on top of the raw [`Stage`] protocol:
///
/// - after a failed `next()` it refuses further pulls until `reset()` or
///   `restore()`
/// - checkpoints optionally start with the pipeline shape, so a tape from a
///   differently composed pipeline is rejected instead of misread
/// - tracing and metrics
///
/// # Example
///
/// ```rust
/// use datapipe::pipeline::PipelineBuilder;
///
/// let mut pipeline = PipelineBuilder::read_list(vec![1, 2, 3, 4, 5, 6])
///     .filter(|x| x % 2 == 0)
///     .build();
///
/// assert_eq!(pipeline.next().unwrap(), Some(2));
/// assert_eq!(pipeline.next().unwrap(), Some(4));
/// let tape = pipeline.checkpoint();
///
/// let mut resumed = PipelineBuilder::read_list(vec![1, 2, 3, 4, 5, 6])
///     .filter(|x| x % 2 == 0)
///     .build();
/// resumed.restore(&tape).unwrap();
/// assert_eq!(resumed.next().unwrap(), Some(6));
/// assert_eq!(resumed.next().unwrap(), None);
/// ```
pub struct Pipeline<T> {
    stage: BoxedStage<T>,
    config: PipelineConfig,
    metrics: PipelineMetrics,
    broken: bool,
    error_reported: bool,
    produced: u64,
}

impl<T> Pipeline<T> {
    /// Wrap a stage chain.
    pub fn new(stage: BoxedStage<T>, config: PipelineConfig) -> Self {
        let metrics = if config.metrics {
            init_metrics();
            PipelineMetrics::new(&config.name)
        } else {
            PipelineMetrics::noop()
        };

        Self {
            stage,
            config,
            metrics,
            broken: false,
            error_reported: false,
            produced: 0,
        }
    }

    /// Pull the next element.
    ///
    /// Returns `Ok(None)` on exhaustion, and keeps doing so until reset.
    ///
    /// An error that no stage claimed is attributed to the pipeline name.
    pub fn next(&mut self) -> Result<Option<T>> {
        if self.broken {
            self.error_reported = true;
            return Err(PipelineError::new(BROKEN).with_stage(self.config.name.clone()));
        }

        let _span = self
            .config
            .tracing
            .pipeline_spans
            .then(|| instrument_pipeline(&self.config.name));

        match self.stage.next() {
            Ok(Some(item)) => {
                if self.config.tracing.element_events {
                    trace_element(&self.config.name, self.produced);
                }
                self.produced += 1;
                self.metrics.record_produced();
                Ok(Some(item))
            }
            Ok(None) => {
                trace_exhausted(&self.config.name, self.produced);
                Ok(None)
            }
            Err(err) => {
                self.broken = true;
                self.error_reported = true;
                self.metrics.record_failure();

                let err = err.with_stage(self.config.name.clone());
                trace_error(&self.config.name, err.stage().unwrap_or_default(), &err);
                Err(err)
            }
        }
    }

    /// Rewind to the first element and clear the broken state.
    pub fn reset(&mut self) {
        self.stage.reset();
        self.broken = false;
        self.error_reported = false;
        self.produced = 0;
        trace_reset(&self.config.name);
    }

    /// Record the current position on a new tape.
    ///
    /// The tape is rewound and ready to be read or encoded.
    pub fn checkpoint(&self) -> Tape {
        let mut tape = Tape::new();
        self.record_position(&mut tape);
        tape
    }

    /// Append the current position to `tape`.
    pub fn record_position(&self, tape: &mut Tape) {
        let shape = self.stage.shape();
        if self.config.check_shape {
            tape.record(shape.clone());
        }
        self.stage.record_position(tape);

        self.metrics.record_checkpoint();
        trace_checkpoint(&self.config.name, &shape, tape.len());
    }

    /// Restore a position recorded by [`Pipeline::checkpoint`].
    ///
    /// `tape` itself is not consumed; reading starts from its first field.
    pub fn restore(&mut self, tape: &Tape) -> Result<()> {
        let mut tape = tape.clone();
        tape.rewind();
        self.reload_position(&mut tape)?;
        Ok(())
    }

    /// Restore a position from the current read offset of `tape`.
    ///
    /// On failure the pipeline is marked broken, since stages may have been
    /// partially reloaded. On success [`Pipeline::produced`] restarts at zero.
    pub fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
        let shape = self.stage.shape();
        let result = self.reload_checked(tape, &shape);

        self.broken = result.is_err();
        self.error_reported = false;
        if result.is_ok() {
            self.produced = 0;
            trace_restore(&self.config.name, &shape, tape.position());
        }
        result
    }

    fn reload_checked(
        &mut self,
        tape: &mut Tape,
        shape: &str,
    ) -> std::result::Result<(), TapeError> {
        if self.config.check_shape {
            let found = tape.read::<String>()?;
            if found != shape {
                return Err(TapeError::ShapeMismatch {
                    expected: shape.to_string(),
                    found,
                });
            }
        }
        self.stage.reload_position(tape)
    }

    /// Encode the current position.
    pub fn save_position(&self) -> Result<Vec<u8>> {
        Ok(self.checkpoint().to_bytes()?)
    }

    /// Restore a position encoded by [`Pipeline::save_position`].
    pub fn load_position(&mut self, bytes: &[u8]) -> Result<()> {
        let tape = Tape::from_bytes(bytes)?;
        self.restore(&tape)
    }

    /// Whether a previous failure left the pipeline unusable.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Elements returned since construction, the last reset or the last
    /// successful restore.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Shape of the stage chain.
    pub fn shape(&self) -> String {
        self.stage.shape()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Recover the stage chain.
    pub fn into_stage(self) -> BoxedStage<T> {
        self.stage
    }
}

impl<T> Iterator for Pipeline<T> {
    type Item = Result<T>;

    /// Yields elements until exhaustion. A failure is yielded once; the
    /// broken pipeline then ends iteration. A pipeline broken by a failed
    /// restore yields the broken-state error once.
    fn next(&mut self) -> Option<Self::Item> {
        if self.broken && self.error_reported {
            return None;
        }
        Pipeline::next(self).transpose()
    }
}

impl<T> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.config.name)
            .field("shape", &self.stage.shape())
            .field("broken", &self.broken)
            .field("produced", &self.produced)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{Filter, ListSource, Map};

    fn evens(items: Vec<i32>) -> Pipeline<i32> {
        let stage = Filter::new(ListSource::new(items), |x: &i32| Ok(x % 2 == 0));
        Pipeline::new(Box::new(stage), PipelineConfig::named("evens"))
    }

    fn failing() -> Pipeline<i32> {
        let stage = Filter::new(ListSource::new(vec![1, 2, 3]), |x: &i32| {
            if *x == 2 {
                Err("cannot judge two".into())
            } else {
                Ok(true)
            }
        });
        Pipeline::new(Box::new(stage), PipelineConfig::default())
    }

    /// Source whose read fails on the second pull without naming itself.
    struct Flaky {
        pulls: u64,
    }

    impl Stage for Flaky {
        type Item = i32;

        fn next(&mut self) -> Result<Option<i32>> {
            self.pulls += 1;
            if self.pulls == 2 {
                return Err(PipelineError::new("disk read failed"));
            }
            Ok(Some(self.pulls as i32))
        }

        fn reset(&mut self) {
            self.pulls = 0;
        }

        fn record_position(&self, tape: &mut Tape) {
            tape.record(self.pulls);
        }

        fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
            self.pulls = tape.read()?;
            Ok(())
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn test_unclaimed_error_attributed_to_pipeline() {
        let stage = Map::new(
            Filter::new(Flaky { pulls: 0 }, |_: &i32| Ok(true)),
            |x: &i32| Ok(x * 2),
        );
        let mut pipeline = Pipeline::new(Box::new(stage), PipelineConfig::named("reader"));

        assert_eq!(pipeline.next().unwrap(), Some(2));
        let err = pipeline.next().unwrap_err();
        assert_eq!(err.message(), "disk read failed");
        assert_eq!(err.stage(), Some("reader"));
    }

    #[test]
    fn test_restore_restarts_produced_count() {
        let mut pipeline = evens(vec![2, 4, 6, 8]);
        let start = pipeline.checkpoint();
        pipeline.next().unwrap();
        pipeline.next().unwrap();
        assert_eq!(pipeline.produced(), 2);

        pipeline.restore(&start).unwrap();
        assert_eq!(pipeline.produced(), 0);
        pipeline.next().unwrap();
        assert_eq!(pipeline.produced(), 1);
    }

    #[test]
    fn test_iterator_reports_failed_restore_once() {
        let mut pipeline = evens(vec![2, 4]);
        assert!(pipeline.restore(&Tape::new()).is_err());

        let err = Iterator::next(&mut pipeline).unwrap().unwrap_err();
        assert_eq!(err.message(), BROKEN);
        assert!(Iterator::next(&mut pipeline).is_none());

        pipeline.reset();
        let items: Vec<i32> = pipeline.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(items, vec![2, 4]);
    }

    #[test]
    fn test_checkpoint_has_shape_header() {
        let mut pipeline = evens(vec![1, 2, 3, 4]);
        pipeline.next().unwrap();

        let mut tape = pipeline.checkpoint();
        assert_eq!(tape.read::<String>().unwrap(), "list>filter");
        assert_eq!(tape.read::<u64>().unwrap(), 2);
    }

    #[test]
    fn test_bare_checkpoint_is_stage_tape() {
        let stage = Filter::new(ListSource::new(vec![1, 2, 3]), |_: &i32| Ok(true));
        let mut pipeline = Pipeline::new(Box::new(stage), PipelineConfig::bare());
        pipeline.next().unwrap();

        let tape = pipeline.checkpoint();
        assert_eq!(tape.len(), 1);
    }

    #[test]
    fn test_shape_mismatch_detected() {
        let tape = evens(vec![1, 2, 3]).checkpoint();

        let source = ListSource::new(vec![1, 2, 3]);
        let mut other = Pipeline::new(Box::new(source), PipelineConfig::default());

        let err = other.restore(&tape).unwrap_err();
        let cause = err.cause().and_then(|c| c.downcast_ref::<TapeError>());
        assert!(matches!(cause, Some(TapeError::ShapeMismatch { .. })));
        assert!(other.is_broken());
    }

    #[test]
    fn test_broken_after_failure_until_reset() {
        let mut pipeline = failing();
        assert_eq!(pipeline.next().unwrap(), Some(1));
        assert!(pipeline.next().is_err());
        assert!(pipeline.is_broken());

        let err = pipeline.next().unwrap_err();
        assert_eq!(err.message(), BROKEN);

        pipeline.reset();
        assert!(!pipeline.is_broken());
        assert_eq!(pipeline.next().unwrap(), Some(1));
    }

    #[test]
    fn test_restore_clears_broken_state() {
        let mut pipeline = failing();
        let start = pipeline.checkpoint();
        pipeline.next().unwrap();
        pipeline.next().unwrap_err();

        pipeline.restore(&start).unwrap();
        assert!(!pipeline.is_broken());
        assert_eq!(pipeline.next().unwrap(), Some(1));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let results: Vec<Result<i32>> = failing().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_save_and_load_position() {
        let mut pipeline = evens(vec![2, 4, 6, 8]);
        pipeline.next().unwrap();
        let bytes = pipeline.save_position().unwrap();

        let mut resumed = evens(vec![2, 4, 6, 8]);
        resumed.load_position(&bytes).unwrap();
        assert_eq!(resumed.next().unwrap(), Some(4));
    }

    #[test]
    fn test_produced_counter() {
        let mut pipeline = evens(vec![1, 2, 4]);
        while pipeline.next().unwrap().is_some() {}
        assert_eq!(pipeline.produced(), 2);
        pipeline.reset();
        assert_eq!(pipeline.produced(), 0);
    }
}
