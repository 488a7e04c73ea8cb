//! Stage Chain - Sequential record transformation
//!
//! The `Chain` applies record stages in order. A stage that drops the
//! record short-circuits the rest of the chain: zero-or-one record out
//! per record in, exactly like each individual stage.
//!
//! # Design
//!
//! - **Zero-cost when empty**: an empty chain forwards with a boolean check
//! - **Sequential execution**: each stage receives the previous stage's
//!   output
//! - **Drop short-circuit**: the first `None` ends processing for that
//!   record

use sift_record::EventRecord;

use crate::{Stage, StageResult};

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;

/// Chain of stages applied sequentially
///
/// Only enabled stages are kept; if every stage is disabled the chain is a
/// no-op that forwards everything.
pub struct Chain {
    stages: Vec<Box<dyn Stage>>,
    enabled: bool,
}

impl Chain {
    /// Create a new chain, keeping only enabled stages
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        let active: Vec<_> = stages.into_iter().filter(|s| s.enabled()).collect();
        let enabled = !active.is_empty();

        Self {
            stages: active,
            enabled,
        }
    }

    /// Create an empty chain (forwards everything)
    pub fn empty() -> Self {
        Self {
            stages: Vec::new(),
            enabled: false,
        }
    }

    /// Whether the chain has any active stages
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of active stages
    #[inline]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of all active stages
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Get a stage by name
    pub fn get(&self, name: &str) -> Option<&dyn Stage> {
        self.stages
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Run one record through every stage in order
    ///
    /// Returns `Ok(None)` as soon as any stage drops the record.
    pub async fn apply(&self, record: EventRecord) -> StageResult<Option<EventRecord>> {
        if !self.enabled {
            return Ok(Some(record));
        }

        let mut current = record;
        for stage in &self.stages {
            match stage.apply(current).await? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::empty()
    }
}
