//! Fluent pipeline builder.
//!
//! # Example
//!
//! ```rust
//! use datapipe::pipeline::{PipelineBuilder, PipelineConfig};
//!
//! let mut pipeline = PipelineBuilder::read_list((1..=10).collect::<Vec<i32>>())
//!     .filter(|x| x % 3 != 0)
//!     .map(|x| x * 100)
//!     .batch(3, false)
//!     .unwrap()
//!     .with_config(PipelineConfig::named("demo"))
//!     .build();
//!
//! assert_eq!(pipeline.next().unwrap(), Some(vec![100, 200, 400]));
//! ```

use std::fmt::Debug;

use crate::error::{BoxError, Result};
use crate::stage::{BoxedStage, Stage};
use crate::stages::{Batch, CountSource, Filter, ListSource, Map, Shard, Take};

use super::{Pipeline, PipelineConfig};

/// Composes stages outward from a generating stage.
///
/// Each method wraps the current chain in one more stage, so the first
/// stage added is the first applied.
pub struct PipelineBuilder<T> {
    stage: BoxedStage<T>,
    config: PipelineConfig,
}

impl<T: 'static> PipelineBuilder<T> {
    /// Start from an arbitrary stage.
    pub fn from_stage<S>(stage: S) -> Self
    where
        S: Stage<Item = T> + Send + 'static,
    {
        Self {
            stage: Box::new(stage),
            config: PipelineConfig::default(),
        }
    }

    /// Start from an in-memory list.
    pub fn read_list(items: Vec<T>) -> Self
    where
        T: Clone + Send,
    {
        Self::from_stage(ListSource::new(items))
    }

    /// Keep elements for which `predicate` returns true.
    pub fn filter<F>(self, mut predicate: F) -> Self
    where
        T: Debug + Send + Sync,
        F: FnMut(&T) -> bool + Send + 'static,
    {
        self.try_filter(move |item| Ok::<_, BoxError>(predicate(item)))
    }

    /// Keep elements for which a fallible `predicate` returns true.
    pub fn try_filter<F, E>(self, mut predicate: F) -> Self
    where
        T: Debug + Send + Sync,
        F: FnMut(&T) -> std::result::Result<bool, E> + Send + 'static,
        E: Into<BoxError>,
    {
        let stage = Filter::new(self.stage, move |item: &T| {
            predicate(item).map_err(Into::<BoxError>::into)
        });
        Self {
            stage: Box::new(stage),
            config: self.config,
        }
    }

    /// Apply `f` to every element.
    pub fn map<U, F>(self, mut f: F) -> PipelineBuilder<U>
    where
        T: Debug + Send + Sync,
        U: 'static,
        F: FnMut(&T) -> U + Send + 'static,
    {
        self.try_map(move |item| Ok::<_, BoxError>(f(item)))
    }

    /// Apply a fallible `f` to every element.
    pub fn try_map<U, F, E>(self, mut f: F) -> PipelineBuilder<U>
    where
        T: Debug + Send + Sync,
        U: 'static,
        F: FnMut(&T) -> std::result::Result<U, E> + Send + 'static,
        E: Into<BoxError>,
    {
        let stage = Map::new(self.stage, move |item: &T| {
            f(item).map_err(Into::<BoxError>::into)
        });
        PipelineBuilder {
            stage: Box::new(stage),
            config: self.config,
        }
    }

    /// Group elements into vectors of `batch_size`.
    pub fn batch(self, batch_size: usize, drop_remainder: bool) -> Result<PipelineBuilder<Vec<T>>>
    where
        T: Send,
    {
        let stage = Batch::new(self.stage, batch_size, drop_remainder)?;
        Ok(PipelineBuilder {
            stage: Box::new(stage),
            config: self.config,
        })
    }

    /// Keep shard `shard_idx` of a `num_shards`-way round-robin split.
    pub fn shard(self, shard_idx: usize, num_shards: usize) -> Result<Self> {
        let stage = Shard::new(self.stage, shard_idx, num_shards)?;
        Ok(Self {
            stage: Box::new(stage),
            config: self.config,
        })
    }

    /// Stop after `count` elements.
    pub fn take(self, count: u64) -> Self {
        Self {
            stage: Box::new(Take::new(self.stage, count)),
            config: self.config,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the pipeline name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Shape of the chain built so far.
    pub fn shape(&self) -> String {
        self.stage.shape()
    }

    /// Finish the pipeline.
    pub fn build(self) -> Pipeline<T> {
        Pipeline::new(self.stage, self.config)
    }
}

impl PipelineBuilder<i64> {
    /// Start from an endless counter.
    pub fn count(start: i64, step: i64) -> Self {
        Self::from_stage(CountSource::new(start, step))
    }
}
