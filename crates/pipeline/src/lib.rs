//! Sift - Pipeline
//!
//! The async wiring that drives records through the transform stages.
//!
//! # Architecture
//!
//! ```text
//! [Producer] → mpsc(1) → [Chain: filter…] → mpsc(1) → [SafeJson] → mpsc(1) → [Consumer]
//! ```
//!
//! # Key Design
//!
//! - **One task per stage**: each stage processes exactly one record at a
//!   time and produces output in input order
//! - **Lossless backpressure**: bounded channels with `send().await`; a
//!   stage does not take a new record until downstream accepted its output,
//!   so a slow consumer stalls the producer instead of growing a buffer
//! - **End-of-stream by closure**: when the producer drops its sender the
//!   stage tasks drain, drop their own senders, and the closure cascades to
//!   the output; there is no error state mid-stream
//!
//! # Example
//!
//! ```ignore
//! use sift_pipeline::Pipeline;
//! use sift_stage::{FilterConfig, RenderConfig, SubscriptionRule};
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(1);
//! let mut handle = Pipeline::builder()
//!     .filter(FilterConfig::new().subscribe("request", SubscriptionRule::all()))
//!     .render(RenderConfig::default())
//!     .build()
//!     .spawn(rx);
//!
//! tx.send(record).await?;
//! drop(tx);
//! while let Some(chunk) = handle.recv().await {
//!     sink.write(chunk.as_bytes())?;
//! }
//! ```

mod driver;
mod error;
mod metrics;

pub use driver::{Pipeline, PipelineBuilder, PipelineHandle, DEFAULT_CHANNEL_CAPACITY};
pub use error::{PipelineError, Result};
pub use metrics::{PipelineMetrics, PipelineMetricsHandle, PipelineSnapshot};

// Re-export key types from dependencies for convenience
pub use sift_record::{EventRecord, Value};
pub use sift_stage::{Chain, FilterConfig, RenderConfig, SafeJson};
