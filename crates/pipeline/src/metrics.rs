//! Pipeline-level counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the submit path
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Statements submitted
    pub received: AtomicU64,

    /// Statements that passed the hook chain and fanned out
    pub delivered: AtomicU64,

    /// Statements discarded by the hook chain (or submitted discarded)
    pub discarded: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            received: self.received.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSnapshot {
    pub received: u64,
    pub delivered: u64,
    pub discarded: u64,
}
