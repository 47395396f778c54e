//! Fixed-size batching.

use crate::error::{PipelineError, Result, TapeError};
use crate::stage::Stage;
use crate::tape::Tape;

/// Groups upstream elements into vectors of `batch_size`.
///
/// When upstream runs out mid-batch the partial batch is returned, unless
/// the stage drops remainders. Every batch is built within a single `next()`
/// call, so the stage has no position of its own.
///
/// # Example
///
/// ```rust
/// use datapipe::stage::Stage;
/// use datapipe::stages::{Batch, ListSource};
///
/// let mut batches = Batch::new(ListSource::new(vec![1, 2, 3]), 2, false).unwrap();
/// assert_eq!(batches.next().unwrap(), Some(vec![1, 2]));
/// assert_eq!(batches.next().unwrap(), Some(vec![3]));
/// assert_eq!(batches.next().unwrap(), None);
/// ```
pub struct Batch<S> {
    name: String,
    upstream: S,
    batch_size: usize,
    drop_remainder: bool,
}

/// Upper bound on the up-front reservation for one batch.
const MAX_RESERVE: usize = 1024;

impl<S: Stage> Batch<S> {
    /// Create a batching stage.
    ///
    /// Fails when `batch_size` is zero.
    pub fn new(upstream: S, batch_size: usize, drop_remainder: bool) -> Result<Self> {
        if batch_size == 0 {
            return Err(PipelineError::new("`batch_size` must be greater than zero.")
                .with_stage("batch"));
        }

        Ok(Self {
            name: "batch".to_string(),
            upstream,
            batch_size,
            drop_remainder,
        })
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<S: Stage> Stage for Batch<S> {
    type Item = Vec<S::Item>;

    fn next(&mut self) -> Result<Option<Vec<S::Item>>> {
        let mut batch = Vec::with_capacity(self.batch_size.min(MAX_RESERVE));

        while batch.len() < self.batch_size {
            match self.upstream.next()? {
                Some(item) => batch.push(item),
                None => break,
            }
        }

        if batch.is_empty() || (self.drop_remainder && batch.len() < self.batch_size) {
            return Ok(None);
        }

        Ok(Some(batch))
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
        format!("{}>batch", self.upstream.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::ListSource;

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Batch::new(ListSource::new(vec![1]), 0, false).err().unwrap();
        assert_eq!(err.stage(), Some("batch"));
    }

    #[test]
    fn test_drop_remainder() {
        let mut batch = Batch::new(ListSource::new(vec![1, 2, 3, 4, 5]), 2, true).unwrap();
        assert_eq!(batch.next().unwrap(), Some(vec![1, 2]));
        assert_eq!(batch.next().unwrap(), Some(vec![3, 4]));
        assert_eq!(batch.next().unwrap(), None);
        assert_eq!(batch.next().unwrap(), None);
    }

    #[test]
    fn test_exact_multiple() {
        let mut batch = Batch::new(ListSource::new(vec![1, 2, 3, 4]), 2, false).unwrap();
        assert_eq!(batch.next().unwrap(), Some(vec![1, 2]));
        assert_eq!(batch.next().unwrap(), Some(vec![3, 4]));
        assert_eq!(batch.next().unwrap(), None);
    }

    #[test]
    fn test_batch_round_trip() {
        let mut batch = Batch::new(ListSource::new(vec![1, 2, 3, 4, 5]), 2, false).unwrap();
        batch.next().unwrap();

        let mut tape = Tape::new();
        batch.record_position(&mut tape);

        let mut fresh = Batch::new(ListSource::new(vec![1, 2, 3, 4, 5]), 2, false).unwrap();
        tape.rewind();
        fresh.reload_position(&mut tape).unwrap();
        assert_eq!(fresh.next().unwrap(), Some(vec![3, 4]));
        assert_eq!(fresh.next().unwrap(), Some(vec![5]));
        assert_eq!(fresh.shape(), "list>batch");
    }

    #[test]
    fn test_huge_batch_size_over_short_list() {
        let mut batches =
            Batch::new(ListSource::new(vec![1, 2, 3]), usize::MAX / 8, false).unwrap();
        assert_eq!(batches.next().unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(batches.next().unwrap(), None);

        let mut dropped = Batch::new(ListSource::new(vec![1, 2, 3]), usize::MAX, true).unwrap();
        assert_eq!(dropped.next().unwrap(), None);
    }
}
