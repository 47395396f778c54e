//! Core stage trait.

use crate::error::{Result, TapeError};
use crate::tape::Tape;

/// A boxed, type-erased stage.
pub type BoxedStage<T> = Box<dyn Stage<Item = T> + Send>;

/// One link of a pull pipeline.
///
/// # Lifecycle
///
/// - `next()` is called repeatedly by the consumer
/// - Return `Ok(Some(item))` to emit an element
/// - Return `Ok(None)` to signal exhaustion; later calls keep returning
///   `Ok(None)` until `reset()`
/// - Return `Err(...)` to signal a failure; the stage is not guaranteed to
///   be usable afterwards until it is reset or reloaded
///
/// # Checkpoints
///
/// `record_position` appends the minimal state needed to resume, and
/// `reload_position` consumes exactly the fields `record_position` wrote, in
/// the same order. Reloading a tape into a fresh stage of the same shape
/// must reproduce the remaining sequence of the recorded stage.
///
/// # Example
///
/// ```rust
/// use datapipe::error::{Result, TapeError};
/// use datapipe::stage::Stage;
/// use datapipe::tape::Tape;
///
/// struct Countdown {
///     from: u32,
///     left: u32,
/// }
///
/// impl Stage for Countdown {
///     type Item = u32;
///
///     fn next(&mut self) -> Result<Option<u32>> {
///         if self.left == 0 {
///             return Ok(None);
///         }
///         self.left -= 1;
///         Ok(Some(self.left))
///     }
///
///     fn reset(&mut self) {
///         self.left = self.from;
///     }
///
///     fn record_position(&self, tape: &mut Tape) {
///         tape.record(self.left as u64);
///     }
///
///     fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
///         self.left = tape.read::<u64>()? as u32;
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "countdown"
///     }
/// }
/// ```
pub trait Stage {
    /// The element type this stage produces.
    type Item;

    /// Pull the next element.
    ///
    /// Returns `Ok(None)` when the stage is exhausted.
    fn next(&mut self) -> Result<Option<Self::Item>>;

    /// Rewind to the initial state, as if freshly constructed.
    fn reset(&mut self);

    /// Append this stage's resumption state to `tape`.
    fn record_position(&self, tape: &mut Tape);

    /// Restore the state written by [`Stage::record_position`].
    fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError>;

    /// Name of this stage (for error attribution and logging).
    fn name(&self) -> &str;

    /// Composition of stage kinds, innermost first, joined by `>`.
    ///
    /// Two pipelines with the same shape can exchange tapes.
    fn shape(&self) -> String {
        self.name().to_string()
    }
}

impl<S: Stage + ?Sized> Stage for Box<S> {
    type Item = S::Item;

    #[inline]
    fn next(&mut self) -> Result<Option<Self::Item>> {
        (**self).next()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn record_position(&self, tape: &mut Tape) {
        (**self).record_position(tape)
    }

    fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
        (**self).reload_position(tape)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn shape(&self) -> String {
        (**self).shape()
    }
}

/// Iterator over the elements of a stage.
///
/// Yields `Ok(item)` until exhaustion. A failure is yielded once, after
/// which the iterator is fused.
pub struct StageIter<S> {
    stage: S,
    done: bool,
}

impl<S: Stage> StageIter<S> {
    /// Wrap a stage.
    pub fn new(stage: S) -> Self {
        Self { stage, done: false }
    }

    /// Recover the wrapped stage.
    pub fn into_inner(self) -> S {
        self.stage
    }
}

impl<S: Stage> Iterator for StageIter<S> {
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.stage.next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<S: Stage> std::iter::FusedIterator for StageIter<S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct Numbers {
        items: Vec<u32>,
        pos: usize,
        fail_at: Option<usize>,
    }

    impl Stage for Numbers {
        type Item = u32;

        fn next(&mut self) -> Result<Option<u32>> {
            if Some(self.pos) == self.fail_at {
                return Err(PipelineError::new("broken source").with_stage("numbers"));
            }
            let item = self.items.get(self.pos).copied();
            if item.is_some() {
                self.pos += 1;
            }
            Ok(item)
        }

        fn reset(&mut self) {
            self.pos = 0;
        }

        fn record_position(&self, tape: &mut Tape) {
            tape.record(self.pos);
        }

        fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
            self.pos = tape.read()?;
            Ok(())
        }

        fn name(&self) -> &str {
            "numbers"
        }
    }

    fn numbers(items: Vec<u32>) -> Numbers {
        Numbers {
            items,
            pos: 0,
            fail_at: None,
        }
    }

    #[test]
    fn test_boxed_stage_delegates() {
        let mut stage: BoxedStage<u32> = Box::new(numbers(vec![1, 2]));
        assert_eq!(stage.name(), "numbers");
        assert_eq!(stage.shape(), "numbers");
        assert_eq!(stage.next().unwrap(), Some(1));

        let mut tape = Tape::new();
        stage.record_position(&mut tape);
        stage.reset();
        assert_eq!(stage.next().unwrap(), Some(1));

        tape.rewind();
        stage.reload_position(&mut tape).unwrap();
        assert_eq!(stage.next().unwrap(), Some(2));
        assert_eq!(stage.next().unwrap(), None);
    }

    #[test]
    fn test_iter_collects_until_exhaustion() {
        let items: Vec<u32> = StageIter::new(numbers(vec![3, 4, 5]))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(items, vec![3, 4, 5]);
    }

    #[test]
    fn test_iter_yields_error_once() {
        let mut stage = numbers(vec![1, 2, 3]);
        stage.fail_at = Some(1);

        let mut iter = StageIter::new(stage);
        assert_eq!(iter.next().unwrap().unwrap(), 1);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
