//! Length limiting.

use crate::error::{Result, TapeError};
use crate::stage::Stage;
use crate::tape::Tape;

/// Yields at most `count` upstream elements.
///
/// The number of elements handed out is part of the position: it is
/// recorded before the upstream position and reloaded in the same order.
pub struct Take<S> {
    name: String,
    upstream: S,
    count: u64,
    taken: u64,
}

impl<S: Stage> Take<S> {
    /// Limit `upstream` to `count` elements.
    pub fn new(upstream: S, count: u64) -> Self {
        Self {
            name: "take".to_string(),
            upstream,
            count,
            taken: 0,
        }
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<S: Stage> Stage for Take<S> {
    type Item = S::Item;

    fn next(&mut self) -> Result<Option<S::Item>> {
        if self.taken >= self.count {
            return Ok(None);
        }

        let item = self.upstream.next()?;
        if item.is_some() {
            self.taken += 1;
        }
        Ok(item)
    }

    fn reset(&mut self) {
        self.upstream.reset();
        self.taken = 0;
    }

    fn record_position(&self, tape: &mut Tape) {
        tape.record(self.taken);
        self.upstream.record_position(tape);
    }

    fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
        let taken = tape.read::<u64>()?;
        self.upstream.reload_position(tape)?;
        self.taken = taken;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> String {
        format!("{}>take", self.upstream.shape())
    }
}
