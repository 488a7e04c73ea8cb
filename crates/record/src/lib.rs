//! Sift - Record
//!
//! The in-memory event record model shared by all pipeline stages.
//!
//! # Overview
//!
//! Upstream producers hand the pipeline structured records, not bytes. A
//! record is a dynamic [`Value`]: scalars, byte buffers, structured errors,
//! and shared containers (arrays and maps). Containers are reference-counted
//! handles, so cloning a `Value` is cheap, forwarding a record preserves its
//! identity, and a container can legally reach itself (a reference cycle).
//! The serializer stage is the only component that has to care about cycles;
//! everything here just makes them representable.
//!
//! # Key Types
//!
//! - [`Value`] - dynamic record value, cyclic-capable
//! - [`EventRecord`] - a `Value` plus accessors for the `event`/`tags` fields
//!   the filter stage reads
//! - [`ErrorValue`] - structured error payload (code, message, cause chain)
//!
//! # Example
//!
//! ```ignore
//! use sift_record::{EventRecord, Value};
//!
//! let record = EventRecord::builder("log")
//!     .tag("debug")
//!     .field("id", 42)
//!     .build();
//!
//! assert_eq!(record.event().as_deref(), Some("log"));
//! assert_eq!(record.tags(), vec!["debug".to_string()]);
//! ```

mod error;
mod record;
mod value;

pub use error::ValueError;
pub use record::{EventRecord, EventRecordBuilder};
pub use value::{ErrorValue, SharedArray, SharedMap, Value};
