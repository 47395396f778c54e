//! Pipeline construction and consumption.
//!
//! - [`PipelineBuilder`]: composes stages outward from a source
//! - [`Pipeline`]: the consumer handle (pull, reset, checkpoint, restore)
//! - [`PipelineConfig`]: naming, shape checking, metrics and tracing
//!
//! # Example
//!
//! ```rust
//! use datapipe::pipeline::PipelineBuilder;
//!
//! let mut pipeline = PipelineBuilder::read_list(vec![1, 2, 3]).map(|x| x + 1).build();
//! let items: Vec<i32> = pipeline.by_ref().collect::<Result<_, _>>().unwrap();
//! assert_eq!(items, vec![2, 3, 4]);
//! ```

mod builder;
mod config;
mod runner;

pub use builder::PipelineBuilder;
pub use config::PipelineConfig;
pub use runner::Pipeline;
