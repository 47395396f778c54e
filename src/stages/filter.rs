//! Predicate-based filtering.

use std::fmt::Debug;

use metrics::Counter;

use crate::error::{BoxError, PipelineError, Result, TapeError};
use crate::observability::dropped_counter;
use crate::stage::Stage;
use crate::tape::Tape;

const PREDICATE_FAILED: &str = "The predicate function has failed.";

/// Forwards only the upstream elements for which a predicate holds.
///
/// Dropped elements are invisible downstream, including to checkpoints: the
/// filter holds no position of its own, so a reloaded filter resumes right
/// after the last element its upstream handed out.
///
/// # Errors
///
/// A predicate failure that already is a [`PipelineError`] propagates
/// unchanged. Any other failure becomes a new `PipelineError` attributed to
/// this stage, carrying the offending element and the original failure as
/// its cause.
///
/// # Example
///
/// ```rust
/// use datapipe::stage::Stage;
/// use datapipe::stages::{Filter, ListSource};
///
/// let mut filter = Filter::new(ListSource::new(vec![1, 2, 3, 4]), |x: &i32| Ok(*x > 2));
/// assert_eq!(filter.next().unwrap(), Some(3));
/// assert_eq!(filter.next().unwrap(), Some(4));
/// assert_eq!(filter.next().unwrap(), None);
/// ```
pub struct Filter<S, F> {
    name: String,
    upstream: S,
    predicate: F,
    stats: FilterStats,
    dropped: Counter,
}

impl<S, F> Filter<S, F>
where
    S: Stage,
    F: FnMut(&S::Item) -> std::result::Result<bool, BoxError>,
{
    /// Create a filter over `upstream`.
    pub fn new(upstream: S, predicate: F) -> Self {
        Self {
            name: "filter".to_string(),
            upstream,
            predicate,
            stats: FilterStats::default(),
            dropped: dropped_counter("filter"),
        }
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.dropped = dropped_counter(&self.name);
        self
    }

    /// Get statistics since construction or the last reset.
    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    /// Borrow the upstream stage.
    pub fn upstream(&self) -> &S {
        &self.upstream
    }
}

impl<S, F> Stage for Filter<S, F>
where
    S: Stage,
    S::Item: Debug + Send + Sync + 'static,
    F: FnMut(&S::Item) -> std::result::Result<bool, BoxError>,
{
    type Item = S::Item;

    fn next(&mut self) -> Result<Option<S::Item>> {
        while let Some(item) = self.upstream.next()? {
            match (self.predicate)(&item) {
                Ok(true) => {
                    self.stats.passed += 1;
                    return Ok(Some(item));
                }
                Ok(false) => {
                    self.stats.dropped += 1;
                    self.dropped.increment(1);
                }
                Err(fault) => {
                    return Err(PipelineError::from_fault(
                        fault,
                        PREDICATE_FAILED,
                        &self.name,
                        item,
                    ));
                }
            }
        }

        Ok(None)
    }

    fn reset(&mut self) {
        self.upstream.reset();
        self.stats = FilterStats::default();
    }

    fn record_position(&self, tape: &mut Tape) {
        self.upstream.record_position(tape);
    }

    fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
        self.upstream.reload_position(tape)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> String {
        format!("{}>filter", self.upstream.shape())
    }
}

/// Statistics for Filter stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Elements that passed the filter.
    pub passed: u64,
    /// Elements that were dropped.
    pub dropped: u64,
}
