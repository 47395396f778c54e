//! Stage protocol for datapipe pipelines.
//!
//! Every link of a pipeline implements [`Stage`]:
//!
//! - `next()` pulls the next element, `Ok(None)` signals exhaustion
//! - `reset()` rewinds to the initial state, upstream included
//! - `record_position()` / `reload_position()` write and read resumption
//!   state on a [`Tape`](crate::tape::Tape), in a mirrored order
//!
//! # Design
//!
//! Stages are synchronous and pull-based. A transforming stage owns exactly
//! one upstream stage by value, so a pipeline is a chain with the
//! generating stage innermost. Dropping the outermost stage tears down the
//! whole chain.
//!
//! # Example
//!
//! ```rust
//! use datapipe::stage::Stage;
//! use datapipe::stages::{Filter, ListSource};
//! use datapipe::tape::Tape;
//!
//! let source = ListSource::new(vec![1, 2, 3, 4, 5, 6]);
//! let mut evens = Filter::new(source, |x: &i32| Ok(x % 2 == 0));
//!
//! assert_eq!(evens.next().unwrap(), Some(2));
//! assert_eq!(evens.next().unwrap(), Some(4));
//!
//! let mut tape = Tape::new();
//! evens.record_position(&mut tape);
//!
//! let mut resumed = Filter::new(ListSource::new(vec![1, 2, 3, 4, 5, 6]), |x: &i32| Ok(x % 2 == 0));
//! tape.rewind();
//! resumed.reload_position(&mut tape).unwrap();
//! assert_eq!(resumed.next().unwrap(), Some(6));
//! assert_eq!(resumed.next().unwrap(), None);
//! ```

mod traits;

pub use traits::{BoxedStage, Stage, StageIter};
