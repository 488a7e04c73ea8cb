//! Pass-through stage
//!
//! Forwards every record untouched. Exists so the chain and pipeline
//! plumbing can be exercised (and its overhead measured) without any
//! filtering in the way.

use std::future::{self, Future};
use std::pin::Pin;

use sift_record::EventRecord;

use crate::{Stage, StageResult};

#[cfg(test)]
#[path = "noop_test.rs"]
mod tests;

/// Forwards every record unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStage;

impl NoopStage {
    /// Create a pass-through stage
    pub fn new() -> Self {
        Self
    }
}

impl Stage for NoopStage {
    fn apply<'a>(
        &'a self,
        record: EventRecord,
    ) -> Pin<Box<dyn Future<Output = StageResult<Option<EventRecord>>> + Send + 'a>> {
        Box::pin(future::ready(Ok(Some(record))))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
