//! Element-wise transformation.

use std::fmt::Debug;

use crate::error::{BoxError, PipelineError, Result, TapeError};
use crate::stage::Stage;
use crate::tape::Tape;

const MAP_FAILED: &str = "The map function has failed.";

/// Applies a function to every upstream element.
///
/// The function borrows its input, so the stage still owns the element when
/// the function fails and can move it into the resulting error. The error
/// policy matches [`Filter`](super::Filter).
///
/// # Example
///
/// ```rust
/// use datapipe::stage::Stage;
/// use datapipe::stages::{ListSource, Map};
///
/// let mut lengths = Map::new(ListSource::new(vec!["ab", "cde"]), |s: &&str| Ok(s.len()));
/// assert_eq!(lengths.next().unwrap(), Some(2));
/// assert_eq!(lengths.next().unwrap(), Some(3));
/// ```
pub struct Map<S, F> {
    name: String,
    upstream: S,
    f: F,
}

impl<S, F, U> Map<S, F>
where
    S: Stage,
    F: FnMut(&S::Item) -> std::result::Result<U, BoxError>,
{
    /// Create a map over `upstream`.
    pub fn new(upstream: S, f: F) -> Self {
        Self {
            name: "map".to_string(),
            upstream,
            f,
        }
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<S, F, U> Stage for Map<S, F>
where
    S: Stage,
    S::Item: Debug + Send + Sync + 'static,
    F: FnMut(&S::Item) -> std::result::Result<U, BoxError>,
{
    type Item = U;

    fn next(&mut self) -> Result<Option<U>> {
        let Some(item) = self.upstream.next()? else {
            return Ok(None);
        };

        match (self.f)(&item) {
            Ok(output) => Ok(Some(output)),
            Err(fault) => Err(PipelineError::from_fault(fault, MAP_FAILED, &self.name, item)),
        }
    }

    fn reset(&mut self) {
        self.upstream.reset();
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
        format!("{}>map", self.upstream.shape())
    }
}
