//! Sift - Stage
//!
//! Streaming transform stages for record pipelines.
//!
//! # Overview
//!
//! Stages sit between a record producer and a byte-oriented sink. Two do the
//! real work:
//!
//! - `filter` - drops records a reporter did not subscribe to, based on
//!   event-type and tag matching rules
//! - `render` - turns each record into one delimited JSON text chunk, safely
//!   handling reference cycles and other values plain JSON cannot express
//!
//! # Design Principles
//!
//! - **One item in flight**: a stage transforms a single record at a time;
//!   buffering is the pipeline's concern, not the stage's
//! - **Never fail mid-stream**: construction may reject bad configuration,
//!   per-record processing never errors
//! - **No shared state**: each stage owns its compiled configuration; there
//!   are no process-wide tables
//!
//! # Architecture
//!
//! ```text
//! [EventRecord] → [Filter] → zero-or-one record → [SafeJson] → "…json…\n"
//! ```
//!
//! # Adding a New Stage
//!
//! 1. Create a config struct with builder methods and, where it can be
//!    misconfigured, a `validate()`.
//! 2. Implement [`Stage`] on the stage struct.
//! 3. If the stage should be reachable from declarative pipeline config,
//!    hook a builder closure into the registry with
//!    [`StageRegistry::with_builder`].
//!
//! # Example
//!
//! ```ignore
//! use sift_stage::{Chain, FilterConfig, FilterStage, SubscriptionRule};
//!
//! let filter = FilterStage::new(
//!     FilterConfig::new().subscribe("log", SubscriptionRule::all()),
//! );
//! let chain = Chain::new(vec![Box::new(filter)]);
//! let forwarded = chain.apply(record).await?;
//! ```

mod chain;
mod error;
pub mod filter;
pub mod noop;
pub mod registry;
pub mod render;

pub use chain::Chain;
pub use error::StageError;
pub use filter::{
    CompiledSubscription, FilterConfig, FilterMetrics, FilterStage, SubscriptionRule,
    Subscriptions, TagFilter, TagSelector,
};
pub use noop::NoopStage;
pub use registry::{StageBuilder, StageConfig, StageRegistry};
pub use render::{Indent, RenderConfig, RenderMetrics, SafeJson};

use std::future::Future;
use std::pin::Pin;

use sift_record::EventRecord;

/// Result type for stage operations
pub type StageResult<T> = Result<T, StageError>;

/// Trait for record stages
///
/// Implementors must be `Send + Sync` so a stage can be driven from a
/// spawned task. A stage receives one record and yields the forwarded
/// record, or `None` to drop it; either way the stage is ready for the
/// next record only after the future resolves.
///
/// Per-record processing is not allowed to fail once a stage is
/// constructed; the error channel exists for stages added later that
/// genuinely can (the pipeline logs and drops on error rather than
/// terminating the stream).
pub trait Stage: Send + Sync {
    /// Transform one record
    ///
    /// Returns `Ok(Some(record))` to forward (the same record, not a copy)
    /// or `Ok(None)` to drop it.
    fn apply<'a>(
        &'a self,
        record: EventRecord,
    ) -> Pin<Box<dyn Future<Output = StageResult<Option<EventRecord>>> + Send + 'a>>;

    /// Name of this stage for logging and metrics
    fn name(&self) -> &'static str;

    /// Whether this stage is currently enabled
    ///
    /// Disabled stages are filtered out of chains at construction time.
    fn enabled(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for dyn Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name()).finish()
    }
}
