//! Pipeline metrics
//!
//! Atomic counters for the record path. All operations use relaxed
//! ordering; values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics for a running pipeline
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Records received from the producer
    records_received: AtomicU64,
    /// Records forwarded by the stage chain
    records_forwarded: AtomicU64,
    /// Records dropped by the stage chain
    records_dropped: AtomicU64,
    /// Chunks emitted by the serializer
    chunks_emitted: AtomicU64,
    /// Bytes of chunk text emitted, separators included
    bytes_emitted: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            records_received: AtomicU64::new(0),
            records_forwarded: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            chunks_emitted: AtomicU64::new(0),
            bytes_emitted: AtomicU64::new(0),
        }
    }

    /// Record a record entering the pipeline
    #[inline]
    pub fn record_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a record forwarded by the chain
    #[inline]
    pub fn record_forwarded(&self) {
        self.records_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a record dropped by the chain
    #[inline]
    pub fn record_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one emitted chunk of the given size
    #[inline]
    pub fn record_chunk(&self, byte_count: u64) {
        self.chunks_emitted.fetch_add(1, Ordering::Relaxed);
        self.bytes_emitted.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    #[inline]
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            records_forwarded: self.records_forwarded.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            chunks_emitted: self.chunks_emitted.load(Ordering::Relaxed),
            bytes_emitted: self.bytes_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSnapshot {
    /// Records received from the producer
    pub records_received: u64,
    /// Records forwarded by the stage chain
    pub records_forwarded: u64,
    /// Records dropped by the stage chain
    pub records_dropped: u64,
    /// Chunks emitted by the serializer
    pub chunks_emitted: u64,
    /// Bytes of chunk text emitted
    pub bytes_emitted: u64,
}

impl PipelineSnapshot {
    /// Fraction of received records that were forwarded (0.0 - 1.0)
    ///
    /// Returns None if no records have been received.
    #[inline]
    pub fn forward_rate(&self) -> Option<f64> {
        if self.records_received == 0 {
            None
        } else {
            Some(self.records_forwarded as f64 / self.records_received as f64)
        }
    }
}

/// Handle for reading pipeline metrics externally
///
/// Remains valid after the pipeline is consumed by `spawn()`.
#[derive(Debug, Clone)]
pub struct PipelineMetricsHandle {
    metrics: Arc<PipelineMetrics>,
}

impl PipelineMetricsHandle {
    pub(crate) fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.metrics.snapshot()
    }
}
