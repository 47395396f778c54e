//! Generating stages.
//!
//! Sources own no upstream; their position is their own cursor.

use crate::error::{Result, TapeError};
use crate::stage::Stage;
use crate::tape::Tape;

/// Yields the elements of an in-memory list, in order.
///
/// Elements are cloned out so the source can be reset and replayed.
///
/// # Example
///
/// ```rust
/// use datapipe::stage::Stage;
/// use datapipe::stages::ListSource;
///
/// let mut src = ListSource::new(vec!["a", "b"]);
/// assert_eq!(src.next().unwrap(), Some("a"));
/// assert_eq!(src.next().unwrap(), Some("b"));
/// assert_eq!(src.next().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct ListSource<T> {
    name: String,
    items: Vec<T>,
    pos: usize,
}

impl<T: Clone> ListSource<T> {
    /// Create a source over `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            name: "list".to_string(),
            items,
            pos: 0,
        }
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of elements already handed out.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> Stage for ListSource<T> {
    type Item = T;

    fn next(&mut self) -> Result<Option<T>> {
        let item = self.items.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        Ok(item)
    }

    fn reset(&mut self) {
        self.pos = 0;
    }

    fn record_position(&self, tape: &mut Tape) {
        tape.record(self.pos as u64);
    }

    fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
        let position = tape.read::<u64>()?;
        match usize::try_from(position) {
            Ok(pos) if pos <= self.items.len() => {
                self.pos = pos;
                Ok(())
            }
            _ => Err(TapeError::InvalidPosition {
                stage: "list",
                position,
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> String {
        "list".to_string()
    }
}

/// Yields `start, start + step, start + 2 * step, ...` without end.
///
/// Arithmetic wraps on overflow. Pair it with [`Take`](super::Take) for a
/// finite sequence.
#[derive(Debug, Clone)]
pub struct CountSource {
    name: String,
    start: i64,
    step: i64,
    counter: i64,
}

impl CountSource {
    /// Count up from `start` by `step`.
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            name: "count".to_string(),
            start,
            step,
            counter: start,
        }
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for CountSource {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Stage for CountSource {
    type Item = i64;

    fn next(&mut self) -> Result<Option<i64>> {
        let value = self.counter;
        self.counter = self.counter.wrapping_add(self.step);
        Ok(Some(value))
    }

    fn reset(&mut self) {
        self.counter = self.start;
    }

    fn record_position(&self, tape: &mut Tape) {
        tape.record(self.counter);
    }

    fn reload_position(&mut self, tape: &mut Tape) -> std::result::Result<(), TapeError> {
        self.counter = tape.read::<i64>()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> String {
        "count".to_string()
    }
}
