//! FIFO statement queue shared by the sink drivers
//!
//! The queue outlives delivery: stopping or pausing a sink leaves queued
//! statements in place, and a later start resumes draining them. Waiting
//! is event-driven with wake-on-enqueue (a condvar for the threaded driver,
//! a `Notify` for the async one) so idle sinks never spin.
//!
//! Statements that exhaust their retry budget move to a dead-letter side
//! queue instead of cycling through the main queue forever.

use std::collections::VecDeque;
use std::time::Duration;

use beacon_statement::Statement;
use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

#[cfg(test)]
#[path = "queue_test.rs"]
mod queue_test;

/// A queued statement plus its failed-attempt count
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub statement: Statement,
    pub attempts: u32,
}

impl QueueEntry {
    /// Wrap a fresh statement with zero attempts
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            attempts: 0,
        }
    }
}

impl From<Statement> for QueueEntry {
    fn from(statement: Statement) -> Self {
        Self::new(statement)
    }
}

/// Unbounded FIFO queue with blocking and async waits
#[derive(Debug, Default)]
pub struct StatementQueue {
    entries: Mutex<VecDeque<QueueEntry>>,
    dead: Mutex<VecDeque<Statement>>,
    condvar: Condvar,
    notify: Notify,
}

impl StatementQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a fresh statement at the back
    pub fn push(&self, statement: Statement) {
        self.push_entry(QueueEntry::new(statement));
    }

    /// Enqueue an entry at the back (retains its attempt count)
    pub fn push_entry(&self, entry: QueueEntry) {
        self.entries.lock().push_back(entry);
        self.wake();
    }

    /// Re-enqueue an entry at the front
    ///
    /// Used when a delivery loop stops with a statement in flight: the
    /// statement goes back to the head so FIFO order survives a restart.
    pub fn push_front(&self, entry: QueueEntry) {
        self.entries.lock().push_front(entry);
        self.wake();
    }

    /// Dequeue the oldest entry
    pub fn pop(&self) -> Option<QueueEntry> {
        self.entries.lock().pop_front()
    }

    /// Dequeue up to `max` entries in FIFO order (`None` drains everything)
    pub fn pop_batch(&self, max: Option<usize>) -> Vec<QueueEntry> {
        let mut entries = self.entries.lock();
        let take = match max {
            Some(max) => max.min(entries.len()),
            None => entries.len(),
        };
        entries.drain(..take).collect()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove every queued entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Block until the queue is non-empty or `timeout` elapses
    ///
    /// Returns `true` if an entry is available. Spurious wakeups are
    /// possible; callers loop around `pop`.
    pub fn wait_non_empty(&self, timeout: Duration) -> bool {
        let mut entries = self.entries.lock();
        if !entries.is_empty() {
            return true;
        }
        self.condvar.wait_for(&mut entries, timeout);
        !entries.is_empty()
    }

    /// Block on the wake signal for up to `timeout`, ignoring contents
    ///
    /// Used by a paused delivery loop: unlike [`wait_non_empty`] this does
    /// not return early just because statements are queued, only on a wake
    /// or the timeout.
    ///
    /// [`wait_non_empty`]: Self::wait_non_empty
    pub fn wait_wake(&self, timeout: Duration) {
        let mut entries = self.entries.lock();
        self.condvar.wait_for(&mut entries, timeout);
    }

    /// Await until the queue is non-empty or `timeout` elapses
    pub async fn wait_non_empty_async(&self, timeout: Duration) -> bool {
        if !self.is_empty() {
            return true;
        }
        let _ = tokio::time::timeout(timeout, self.notify.notified()).await;
        !self.is_empty()
    }

    /// Wake every waiter regardless of queue contents
    ///
    /// Used on pause/stop so a blocked delivery loop re-checks its state
    /// promptly instead of sleeping out its timeout.
    pub fn wake_all(&self) {
        self.condvar.notify_all();
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    fn wake(&self) {
        self.condvar.notify_one();
        self.notify.notify_one();
    }

    // =========================================================================
    // Dead-letter side queue
    // =========================================================================

    /// Move a statement to the dead-letter queue
    pub fn push_dead(&self, statement: Statement) {
        self.dead.lock().push_back(statement);
    }

    /// Number of dead-lettered statements
    pub fn dead_len(&self) -> usize {
        self.dead.lock().len()
    }

    /// Take every dead-lettered statement, oldest first
    pub fn drain_dead(&self) -> Vec<Statement> {
        self.dead.lock().drain(..).collect()
    }
}
