//! Sink lifecycle and delivery events
//!
//! Sinks report state transitions and per-statement outcomes through a
//! [`SinkObserver`]. All callbacks default to no-ops so implementations
//! subscribe only to what they care about. Observers are invoked from the
//! delivery loop and must not block.

use beacon_statement::Statement;

use crate::SendError;

/// Receiver for sink lifecycle and delivery events
pub trait SinkObserver: Send + Sync {
    /// Delivery loop started
    fn on_started_sending(&self, _sink: &str) {}

    /// Dequeuing paused (queue keeps filling)
    fn on_paused_sending(&self, _sink: &str) {}

    /// Delivery loop stopped
    fn on_stopped_sending(&self, _sink: &str) {}

    /// One statement delivered
    fn on_sent_statement(&self, _sink: &str, _statement: &Statement) {}

    /// One statement failed a send attempt (will retry or dead-letter)
    fn on_failed_sending_statement(&self, _sink: &str, _statement: &Statement, _error: &SendError) {
    }

    /// A whole batch delivered
    fn on_sent_batch(&self, _sink: &str, _count: usize) {}

    /// A whole batch failed (one event per batch, not per statement)
    fn on_failed_sending_batch(&self, _sink: &str, _count: usize, _error: &SendError) {}

    /// A statement exhausted its retry budget and was dead-lettered
    fn on_dead_letter(&self, _sink: &str, _statement: &Statement) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SinkObserver for NoopObserver {}
