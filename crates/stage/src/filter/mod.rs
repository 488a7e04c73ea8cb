//! Filter Stage - Drop records a reporter did not subscribe to
//!
//! Tests each record's event type and tags against a subscription table
//! compiled once at construction, and forwards or drops the record
//! unchanged. Matching is exact: event types compare case-insensitively,
//! tags case-sensitively.
//!
//! # Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | `enabled` | bool | `true` | Whether the stage participates in chains |
//! | `events` | table | `{}` | Subscription rules keyed by event type |
//!
//! ## Rule Shapes
//!
//! | Shape | Meaning |
//! |-------|---------|
//! | `"*"`, `false`, `0` (or JSON `null`) | report every record of this event type |
//! | `"db"` | report records tagged `db` |
//! | `["db", "auth"]` | report records carrying any listed tag |
//! | `{ include = "api", exclude = "debug" }` | include/exclude selectors |
//!
//! A missing event-type key means records of that type are never reported.
//! An empty (or wildcard) include selector accepts every tag combination,
//! including records with no tags; a non-empty one requires at least one
//! matching tag. Exclusions always veto.
//!
//! # TOML Examples
//!
//! ```toml
//! # Everything the server logs, but never debug chatter
//! [stages.events]
//! log = { include = "*", exclude = "debug" }
//! error = "*"
//!
//! # Only database errors
//! [stages.events]
//! error = "db"
//! ```
//!
//! # Rust Example
//!
//! ```ignore
//! let config = FilterConfig::new()
//!     .subscribe("log", SubscriptionRule::all())
//!     .subscribe("error", SubscriptionRule::tag("db"));
//!
//! let stage = FilterStage::new(config);
//! assert!(stage.should_forward(&record));
//! ```

mod config;
mod subscription;

pub use config::{FilterConfig, SubscriptionRule, Subscriptions, TagSelector};
pub use subscription::{CompiledSubscription, TagFilter};

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use sift_record::EventRecord;

use crate::{Stage, StageResult};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Metrics for the filter stage
#[derive(Debug, Default)]
pub struct FilterMetrics {
    /// Records received
    pub records_received: AtomicU64,
    /// Records forwarded downstream
    pub records_forwarded: AtomicU64,
    /// Records dropped
    pub records_dropped: AtomicU64,
}

impl FilterMetrics {
    /// Get drop rate (0.0 - 1.0)
    pub fn drop_rate(&self) -> f64 {
        let received = self.records_received.load(Ordering::Relaxed);
        let dropped = self.records_dropped.load(Ordering::Relaxed);
        if received == 0 {
            0.0
        } else {
            dropped as f64 / received as f64
        }
    }
}

/// Filter stage
///
/// Owns an immutable compiled subscription table. Stateless across records.
pub struct FilterStage {
    enabled: bool,
    subscription: CompiledSubscription,
    metrics: FilterMetrics,
}

impl FilterStage {
    /// Create a new filter stage, compiling the subscription rules
    pub fn new(config: FilterConfig) -> Self {
        let subscription = CompiledSubscription::compile(&config.events);
        tracing::debug!(
            event_types = subscription.len(),
            enabled = config.enabled,
            "event filter compiled"
        );

        Self {
            enabled: config.enabled,
            subscription,
            metrics: FilterMetrics::default(),
        }
    }

    /// Get the compiled subscription table
    pub fn subscription(&self) -> &CompiledSubscription {
        &self.subscription
    }

    /// Get stage metrics
    pub fn metrics(&self) -> &FilterMetrics {
        &self.metrics
    }

    /// Whether this record should be forwarded
    ///
    /// Pure: the same record against the same table always answers the same.
    /// Records with no subscribed event type are dropped; a record whose
    /// `tags` field is not a sequence matches as if it carried no tags.
    pub fn should_forward(&self, record: &EventRecord) -> bool {
        let Some(event) = record.event() else {
            return false;
        };
        let Some(filter) = self.subscription.lookup(&event) else {
            return false;
        };
        filter.accepts(&record.tags())
    }
}

impl Stage for FilterStage {
    fn apply<'a>(
        &'a self,
        record: EventRecord,
    ) -> Pin<Box<dyn Future<Output = StageResult<Option<EventRecord>>> + Send + 'a>> {
        Box::pin(async move {
            self.metrics.records_received.fetch_add(1, Ordering::Relaxed);

            if self.should_forward(&record) {
                self.metrics.records_forwarded.fetch_add(1, Ordering::Relaxed);
                Ok(Some(record))
            } else {
                self.metrics.records_dropped.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        })
    }

    fn name(&self) -> &'static str {
        "filter"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }
}

impl std::fmt::Debug for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStage")
            .field("enabled", &self.enabled)
            .field("subscription", &self.subscription)
            .field("metrics", &self.metrics)
            .finish()
    }
}
