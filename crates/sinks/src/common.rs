//! Common types shared by all sink drivers
//!
//! Configuration, lifecycle state, delivery-cycle outcomes, and metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::RetryPolicy;

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;

/// Common configuration for sinks
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Unique identifier for this sink (used in logs and events)
    pub id: String,

    /// Whether this sink participates in fan-out
    pub enabled: bool,

    /// Single-item or batched delivery
    pub mode: DeliveryMode,

    /// Retry/backoff/dead-letter policy for transient failures
    pub retry: RetryPolicy,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            enabled: true,
            mode: DeliveryMode::Single,
            retry: RetryPolicy::default(),
        }
    }
}

impl SinkConfig {
    /// Set the sink identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Switch to batched delivery with an optional per-cycle cap
    ///
    /// `None` means a batch drains the whole queue in one cycle.
    #[must_use]
    pub fn with_batching(mut self, max_batch_size: Option<usize>) -> Self {
        self.mode = DeliveryMode::Batch { max_batch_size };
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Mark the sink as disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// How the delivery loop pulls work from the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// One statement per send call
    Single,

    /// Up to `max_batch_size` statements per send call (`None` = unlimited)
    Batch { max_batch_size: Option<usize> },
}

/// Lifecycle state of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Not delivering; the queue is retained for a future start
    Stopped,

    /// Delivery loop active
    Sending,

    /// Loop alive but dequeuing halted; the queue keeps filling
    Paused,
}

/// Result of one delivery cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Statement(s) delivered
    Success,

    /// Queue was empty, nothing attempted
    NoStatements,

    /// Credentials rejected; the sink has stopped
    InvalidCredentials,

    /// Transient failure; statement(s) requeued
    Error,
}

/// Metrics shared by all sink drivers
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Statements delivered
    pub statements_sent: AtomicU64,

    /// Individual send failures (transient)
    pub statements_failed: AtomicU64,

    /// Batches delivered
    pub batches_sent: AtomicU64,

    /// Batch-level failures
    pub batches_failed: AtomicU64,

    /// Requeues after a transient failure
    pub retries: AtomicU64,

    /// Statements moved to the dead-letter queue
    pub dead_lettered: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            statements_sent: AtomicU64::new(0),
            statements_failed: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            dead_lettered: AtomicU64::new(0),
        }
    }

    /// Record delivered statements
    #[inline]
    pub fn record_sent(&self, count: u64) {
        self.statements_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a delivered batch of `count` statements
    #[inline]
    pub fn record_batch_sent(&self, count: u64) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.statements_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a transient single-send failure
    #[inline]
    pub fn record_failed(&self) {
        self.statements_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch-level failure of `count` statements
    #[inline]
    pub fn record_batch_failed(&self, count: u64) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.statements_failed.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a requeue
    #[inline]
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dead-lettered statement
    #[inline]
    pub fn record_dead_letter(&self) {
        self.dead_lettered.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            statements_sent: self.statements_sent.load(Ordering::Relaxed),
            statements_failed: self.statements_failed.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            dead_lettered: self.dead_lettered.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub statements_sent: u64,
    pub statements_failed: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub retries: u64,
    pub dead_lettered: u64,
}
