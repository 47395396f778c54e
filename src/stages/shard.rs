//! Round-robin sharding.

use crate::error::{PipelineError, Result, TapeError};
use crate::stage::Stage;
use crate::tape::Tape;

/// Keeps every `num_shards`-th element, starting at `shard_idx`.
///
/// Each `next()` consumes one full group of `num_shards` upstream elements.
/// A trailing group too short to contain this shard's element ends the
/// sequence, so every shard yields the same number of elements.
pub struct Shard<S> {
    name: String,
    upstream: S,
    shard_idx: usize,
    num_shards: usize,
}

impl<S: Stage> Shard<S> {
    /// Create a sharding stage.
    ///
    /// Fails unless `shard_idx < num_shards`.
    pub fn new(upstream: S, shard_idx: usize, num_shards: usize) -> Result<Self> {
        if shard_idx >= num_shards {
            return Err(PipelineError::new(format!(
                "`shard_idx` must be less than `num_shards` ({num_shards}), but is {shard_idx}."
            ))
            .with_stage("shard"));
        }

        Ok(Self {
            name: "shard".to_string(),
            upstream,
            shard_idx,
            num_shards,
        })
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<S: Stage> Stage for Shard<S> {
    type Item = S::Item;

    fn next(&mut self) -> Result<Option<S::Item>> {
        let mut selected = None;

        for idx in 0..self.num_shards {
            let Some(item) = self.upstream.next()? else {
                return Ok(None);
            };
            if idx == self.shard_idx {
                selected = Some(item);
            }
        }

        Ok(selected)
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
        format!("{}>shard", self.upstream.shape())
    }
}
