//! Built-in pipeline stages.
//!
//! ## Sources
//! - [`ListSource`]: Yields the elements of an in-memory list
//! - [`CountSource`]: Yields an endless arithmetic sequence
//!
//! ## Transforms
//! - [`Filter`]: Keeps elements matching a predicate
//! - [`Map`]: Applies a function to each element
//! - [`Batch`]: Groups elements into fixed-size vectors
//! - [`Shard`]: Keeps one shard of a round-robin split
//! - [`Take`]: Stops after a number of elements

mod batch;
mod filter;
mod map;
mod shard;
mod source;
mod take;

pub use batch::Batch;
pub use filter::{Filter, FilterStats};
pub use map::Map;
pub use shard::Shard;
pub use source::{CountSource, ListSource};
pub use take::Take;
