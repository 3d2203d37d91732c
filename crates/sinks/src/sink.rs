//! Threaded sink driver
//!
//! One worker thread per started sink drains the queue toward a blocking
//! [`Transport`]. Statements survive stop/pause: the queue is owned by the
//! sink, not the worker, so a restart resumes where delivery left off.
//!
//! # Failure handling
//!
//! Transient errors requeue the statement and back off exponentially up to
//! the retry budget; exhausted statements move to the dead-letter queue. A
//! credentials rejection stops the sink with the in-flight statement
//! restored to the head of the queue.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use beacon_statement::Statement;
use parking_lot::Mutex;

use crate::{
    DeliveryMode, MetricsSnapshot, NoopObserver, QueueEntry, SendError, SendOutcome, SinkConfig,
    SinkMetrics, SinkObserver, SinkState, StatementQueue, Transport,
};

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;

/// Wait when the queue is empty before re-checking state
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Wait while paused before re-checking state
const PAUSE_WAIT: Duration = Duration::from_millis(100);

/// Granularity of the interruptible backoff sleep
const BACKOFF_SLICE: Duration = Duration::from_millis(25);

/// A sink with its own queue and background delivery thread
///
/// Cheap to clone; clones share the queue, state, and metrics.
#[derive(Clone)]
pub struct Sink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    name: String,
    config: SinkConfig,
    state: Mutex<SinkState>,
    queue: StatementQueue,
    transport: Mutex<Box<dyn Transport>>,
    observer: Arc<dyn SinkObserver>,
    metrics: SinkMetrics,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Sink {
    /// Create a stopped sink over the given transport
    pub fn new(config: SinkConfig, transport: Box<dyn Transport>) -> Self {
        Self::with_observer(config, transport, Arc::new(NoopObserver))
    }

    /// Create a stopped sink with a lifecycle/delivery observer
    pub fn with_observer(
        config: SinkConfig,
        transport: Box<dyn Transport>,
        observer: Arc<dyn SinkObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                name: config.id.clone(),
                config,
                state: Mutex::new(SinkState::Stopped),
                queue: StatementQueue::new(),
                transport: Mutex::new(transport),
                observer,
                metrics: SinkMetrics::new(),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Sink identifier
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether this sink participates in fan-out
    pub fn enabled(&self) -> bool {
        self.inner.config.enabled
    }

    /// Current lifecycle state
    pub fn state(&self) -> SinkState {
        *self.inner.state.lock()
    }

    /// Point-in-time delivery metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Number of statements waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    /// Number of dead-lettered statements
    pub fn dead_letter_len(&self) -> usize {
        self.inner.queue.dead_len()
    }

    /// Take every dead-lettered statement, oldest first
    pub fn drain_dead_letters(&self) -> Vec<Statement> {
        self.inner.queue.drain_dead()
    }

    /// Enqueue a statement for delivery
    ///
    /// Discarded statements are dropped here; they never reach a transport.
    /// Enqueuing works in any state: a stopped or paused sink accumulates
    /// statements for a later start.
    pub fn send_statement(&self, statement: Statement) {
        if statement.discarded() {
            tracing::debug!(sink = %self.inner.name, "dropping discarded statement");
            return;
        }
        self.inner.queue.push(statement);
    }

    /// Start (or resume) the delivery loop
    pub fn start_sending(&self) {
        let inner = &self.inner;
        if !inner.config.enabled {
            tracing::warn!(sink = %inner.name, "sink disabled, not starting");
            return;
        }

        {
            let mut state = inner.state.lock();
            match *state {
                SinkState::Sending => return,
                SinkState::Paused => {
                    // Worker is alive and waiting; flip the state and wake it.
                    *state = SinkState::Sending;
                    drop(state);
                    inner.queue.wake_all();
                    inner.observer.on_started_sending(&inner.name);
                    return;
                }
                SinkState::Stopped => *state = SinkState::Sending,
            }
        }

        // Reap a worker left over from a previous run.
        if let Some(handle) = inner.worker.lock().take() {
            let _ = handle.join();
        }

        inner.observer.on_started_sending(&inner.name);
        tracing::info!(sink = %inner.name, "starting delivery");

        let worker_inner = Arc::clone(inner);
        let spawned = thread::Builder::new()
            .name(format!("sink-{}", inner.name))
            .spawn(move || run(worker_inner));
        match spawned {
            Ok(handle) => *inner.worker.lock() = Some(handle),
            Err(err) => {
                tracing::error!(sink = %inner.name, error = %err, "failed to spawn delivery thread");
                *inner.state.lock() = SinkState::Stopped;
            }
        }
    }

    /// Pause dequeuing; the queue keeps filling
    pub fn pause_sending(&self) {
        let inner = &self.inner;
        {
            let mut state = inner.state.lock();
            if *state != SinkState::Sending {
                return;
            }
            *state = SinkState::Paused;
        }
        inner.queue.wake_all();
        tracing::info!(sink = %inner.name, "paused delivery");
        inner.observer.on_paused_sending(&inner.name);
    }

    /// Stop the delivery loop and wait for the worker to exit
    ///
    /// Queued statements are retained for a future start.
    pub fn stop_sending(&self) {
        let inner = &self.inner;
        let was_stopped = {
            let mut state = inner.state.lock();
            let was = *state == SinkState::Stopped;
            *state = SinkState::Stopped;
            was
        };
        inner.queue.wake_all();

        let handle = inner.worker.lock().take();
        match handle {
            // The worker fires `on_stopped_sending` on its way out.
            Some(handle) => {
                let _ = handle.join();
            }
            None if !was_stopped => inner.observer.on_stopped_sending(&inner.name),
            None => {}
        }
    }

    /// Stop delivery and release transport resources
    pub fn close(&self) -> Result<(), SendError> {
        self.stop_sending();
        tracing::info!(sink = %self.inner.name, "closing sink");
        self.inner.transport.lock().close()
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.inner.name)
            .field("state", &*self.inner.state.lock())
            .field("queue_len", &self.inner.queue.len())
            .finish()
    }
}

// =============================================================================
// Delivery loop
// =============================================================================

fn run(inner: Arc<SinkInner>) {
    tracing::debug!(sink = %inner.name, "delivery loop started");
    loop {
        match *inner.state.lock() {
            SinkState::Stopped => break,
            SinkState::Paused => {
                inner.queue.wait_wake(PAUSE_WAIT);
                continue;
            }
            SinkState::Sending => {}
        }

        if !inner.transport.lock().check_credentials() {
            tracing::warn!(sink = %inner.name, "credentials rejected, stopping sink");
            *inner.state.lock() = SinkState::Stopped;
            break;
        }

        let outcome = match inner.config.mode {
            DeliveryMode::Single => deliver_single(&inner),
            DeliveryMode::Batch { max_batch_size } => deliver_batch(&inner, max_batch_size),
        };

        match outcome {
            SendOutcome::NoStatements => {
                inner.queue.wait_non_empty(IDLE_WAIT);
            }
            // State was already flipped to Stopped by the delivery fn.
            SendOutcome::InvalidCredentials => break,
            SendOutcome::Success | SendOutcome::Error => {}
        }
    }
    tracing::debug!(sink = %inner.name, "delivery loop stopped");
    inner.observer.on_stopped_sending(&inner.name);
}

fn deliver_single(inner: &SinkInner) -> SendOutcome {
    let Some(mut entry) = inner.queue.pop() else {
        return SendOutcome::NoStatements;
    };

    let result = inner.transport.lock().send(&entry.statement);
    match result {
        Ok(()) => {
            inner.metrics.record_sent(1);
            inner.observer.on_sent_statement(&inner.name, &entry.statement);
            SendOutcome::Success
        }
        Err(err) if err.is_terminal() => {
            tracing::error!(sink = %inner.name, error = %err, "stopping sink");
            inner.queue.push_front(entry);
            *inner.state.lock() = SinkState::Stopped;
            SendOutcome::InvalidCredentials
        }
        Err(err) => {
            entry.attempts += 1;
            tracing::warn!(
                sink = %inner.name,
                error = %err,
                attempts = entry.attempts,
                "send failed"
            );
            inner.metrics.record_failed();
            inner
                .observer
                .on_failed_sending_statement(&inner.name, &entry.statement, &err);

            if inner.config.retry.exhausted(entry.attempts) {
                tracing::warn!(
                    sink = %inner.name,
                    attempts = entry.attempts,
                    "retry budget exhausted, dead-lettering statement"
                );
                inner.metrics.record_dead_letter();
                inner.observer.on_dead_letter(&inner.name, &entry.statement);
                inner.queue.push_dead(entry.statement);
            } else {
                inner.metrics.record_retry();
                let delay = inner.config.retry.delay_for(entry.attempts);
                inner.queue.push_entry(entry);
                backoff(inner, delay);
            }
            SendOutcome::Error
        }
    }
}

fn deliver_batch(inner: &SinkInner, max_batch_size: Option<usize>) -> SendOutcome {
    let entries = inner.queue.pop_batch(max_batch_size);
    if entries.is_empty() {
        return SendOutcome::NoStatements;
    }

    let (attempts, statements): (Vec<u32>, Vec<Statement>) = entries
        .into_iter()
        .map(|entry| (entry.attempts, entry.statement))
        .unzip();
    let count = statements.len();

    let result = {
        let mut transport = inner.transport.lock();
        transport.before_batch().and_then(|()| {
            transport
                .send_batch(&statements)
                .and_then(|()| transport.after_batch())
        })
    };

    match result {
        Ok(()) => {
            inner.metrics.record_batch_sent(count as u64);
            inner.observer.on_sent_batch(&inner.name, count);
            SendOutcome::Success
        }
        Err(err) if err.is_terminal() => {
            tracing::error!(sink = %inner.name, error = %err, "stopping sink");
            // Restore the whole batch to the head, preserving FIFO order.
            for (statement, attempts) in statements.into_iter().zip(attempts).rev() {
                inner.queue.push_front(QueueEntry {
                    statement,
                    attempts,
                });
            }
            *inner.state.lock() = SinkState::Stopped;
            SendOutcome::InvalidCredentials
        }
        Err(err) => {
            tracing::warn!(sink = %inner.name, error = %err, count, "batch send failed");
            inner.metrics.record_batch_failed(count as u64);
            // One event per failed batch, not one per statement.
            inner.observer.on_failed_sending_batch(&inner.name, count, &err);

            let mut max_attempts = 0;
            for (statement, prior) in statements.into_iter().zip(attempts) {
                let attempts = prior + 1;
                if inner.config.retry.exhausted(attempts) {
                    inner.metrics.record_dead_letter();
                    inner.observer.on_dead_letter(&inner.name, &statement);
                    inner.queue.push_dead(statement);
                } else {
                    inner.metrics.record_retry();
                    max_attempts = max_attempts.max(attempts);
                    inner.queue.push_entry(QueueEntry {
                        statement,
                        attempts,
                    });
                }
            }
            if max_attempts > 0 {
                backoff(inner, inner.config.retry.delay_for(max_attempts));
            }
            SendOutcome::Error
        }
    }
}

/// Sleep up to `delay`, returning early if the sink leaves `Sending`
fn backoff(inner: &SinkInner, delay: Duration) {
    let deadline = Instant::now() + delay;
    loop {
        if *inner.state.lock() != SinkState::Sending {
            return;
        }
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            return;
        };
        thread::sleep(remaining.min(BACKOFF_SLICE));
    }
}
