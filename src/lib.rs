//! # datapipe
//!
//! Lazily evaluated, resumable pull pipelines.
//!
//! A pipeline is a chain of [stages](stage::Stage). The consumer pulls
//! elements one at a time from the outermost stage, which pulls from its
//! upstream only as far as it needs to. Any pipeline can record its position
//! on a [`Tape`](tape::Tape) and a freshly built pipeline of the same shape
//! can resume from it.
//!
//! ## Features
//!
//! - **Lazy**: nothing is computed before `next()` asks for it
//! - **Checkpointable**: positions are plain field lists, encodable to bytes
//! - **Uniform errors**: every failure surfaces as a [`PipelineError`] that
//!   names the stage and carries the element that caused it
//! - **Observable**: `tracing` spans and events, `metrics` counters
//!
//! ## Quick Start
//!
//! ```rust
//! use datapipe::prelude::*;
//!
//! let mut pipeline = PipelineBuilder::read_list(vec![1, 2, 3, 4, 5, 6])
//!     .filter(|x| x % 2 == 0)
//!     .build();
//!
//! assert_eq!(pipeline.next()?, Some(2));
//! let tape = pipeline.checkpoint();
//! assert_eq!(pipeline.next()?, Some(4));
//!
//! pipeline.restore(&tape)?;
//! assert_eq!(pipeline.next()?, Some(4));
//! # Ok::<(), datapipe::PipelineError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod observability;
pub mod pipeline;
pub mod stage;
pub mod stages;
pub mod tape;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{BoxError, PipelineError, Result, TapeError};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineConfig};
    pub use crate::stage::{BoxedStage, Stage};
    pub use crate::stages::{Batch, CountSource, Filter, ListSource, Map, Shard, Take};
    pub use crate::tape::Tape;
}

pub use error::{BoxError, PipelineError, Result, TapeError};
