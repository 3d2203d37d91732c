//! Async sink driver
//!
//! Same queue, lifecycle, and retry contract as the threaded [`Sink`], but
//! the delivery loop is a tokio task and the transport is non-blocking.
//! In-flight sends are tracked by a `CancellationToken`: stopping the sink
//! cancels the loop promptly and any statement whose send did not complete
//! goes back to the head of the queue.
//!
//! Batches fan out concurrently, one spawned send per statement, and the
//! loop awaits the whole set before the next cycle.
//!
//! [`Sink`]: crate::Sink

use std::sync::Arc;
use std::time::Duration;

use beacon_statement::Statement;
use parking_lot::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    AsyncTransport, DeliveryMode, MetricsSnapshot, NoopObserver, QueueEntry, SendError,
    SendOutcome, SinkConfig, SinkMetrics, SinkObserver, SinkState, StatementQueue,
};

#[cfg(test)]
#[path = "async_sink_test.rs"]
mod async_sink_test;

/// Wait when the queue is empty before re-checking state
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Wait while paused before re-checking state
const PAUSE_WAIT: Duration = Duration::from_millis(100);

/// A sink whose delivery loop runs as a tokio task
///
/// Cheap to clone; clones share the queue, state, and metrics.
#[derive(Clone)]
pub struct AsyncSink {
    inner: Arc<AsyncSinkInner>,
}

struct AsyncSinkInner {
    name: String,
    config: SinkConfig,
    state: Mutex<SinkState>,
    queue: StatementQueue,
    transport: Arc<dyn AsyncTransport>,
    observer: Arc<dyn SinkObserver>,
    metrics: SinkMetrics,
    cancel: Mutex<CancellationToken>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncSink {
    /// Create a stopped sink over the given transport
    pub fn new(config: SinkConfig, transport: Arc<dyn AsyncTransport>) -> Self {
        Self::with_observer(config, transport, Arc::new(NoopObserver))
    }

    /// Create a stopped sink with a lifecycle/delivery observer
    pub fn with_observer(
        config: SinkConfig,
        transport: Arc<dyn AsyncTransport>,
        observer: Arc<dyn SinkObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(AsyncSinkInner {
                name: config.id.clone(),
                config,
                state: Mutex::new(SinkState::Stopped),
                queue: StatementQueue::new(),
                transport,
                observer,
                metrics: SinkMetrics::new(),
                cancel: Mutex::new(CancellationToken::new()),
                task: Mutex::new(None),
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
    /// Discarded statements are dropped here. Enqueuing works in any state.
    pub fn send_statement(&self, statement: Statement) {
        if statement.discarded() {
            tracing::debug!(sink = %self.inner.name, "dropping discarded statement");
            return;
        }
        self.inner.queue.push(statement);
    }

    /// Start (or resume) the delivery loop
    ///
    /// Must be called within a tokio runtime.
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
                    *state = SinkState::Sending;
                    drop(state);
                    inner.queue.wake_all();
                    inner.observer.on_started_sending(&inner.name);
                    return;
                }
                SinkState::Stopped => *state = SinkState::Sending,
            }
        }

        // Fresh token per run; the previous run's token stays cancelled.
        let cancel = CancellationToken::new();
        *inner.cancel.lock() = cancel.clone();

        inner.observer.on_started_sending(&inner.name);
        tracing::info!(sink = %inner.name, "starting delivery");

        let task_inner = Arc::clone(inner);
        let handle = tokio::spawn(run(task_inner, cancel));
        *inner.task.lock() = Some(handle);
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

    /// Signal the delivery loop to stop
    ///
    /// Synchronous and non-blocking: the loop cancels its in-flight sends,
    /// requeues whatever did not complete, and winds down. Await
    /// [`stopped`] to observe the wind-down.
    ///
    /// [`stopped`]: Self::stopped
    pub fn stop_sending(&self) {
        let inner = &self.inner;
        let was_stopped = {
            let mut state = inner.state.lock();
            let was = *state == SinkState::Stopped;
            *state = SinkState::Stopped;
            was
        };
        inner.cancel.lock().cancel();
        inner.queue.wake_all();

        if inner.task.lock().is_none() && !was_stopped {
            inner.observer.on_stopped_sending(&inner.name);
        }
    }

    /// Wait for the delivery task to exit after [`stop_sending`]
    ///
    /// [`stop_sending`]: Self::stop_sending
    pub async fn stopped(&self) {
        let handle = self.inner.task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Stop delivery, wait for the task, and release transport resources
    pub async fn close(&self) -> Result<(), SendError> {
        self.stop_sending();
        self.stopped().await;
        tracing::info!(sink = %self.inner.name, "closing sink");
        self.inner.transport.close().await
    }
}

impl std::fmt::Debug for AsyncSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSink")
            .field("name", &self.inner.name)
            .field("state", &*self.inner.state.lock())
            .field("queue_len", &self.inner.queue.len())
            .finish()
    }
}

// =============================================================================
// Delivery loop
// =============================================================================

async fn run(inner: Arc<AsyncSinkInner>, cancel: CancellationToken) {
    tracing::debug!(sink = %inner.name, "delivery loop started");
    loop {
        // Copy the state out so the guard never lives across an await.
        let state = *inner.state.lock();
        match state {
            SinkState::Stopped => break,
            SinkState::Paused => {
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(PAUSE_WAIT) => {}
                }
                continue;
            }
            SinkState::Sending => {}
        }

        if !inner.transport.check_credentials() {
            tracing::warn!(sink = %inner.name, "credentials rejected, stopping sink");
            *inner.state.lock() = SinkState::Stopped;
            break;
        }

        let outcome = match inner.config.mode {
            DeliveryMode::Single => deliver_single(&inner, &cancel).await,
            DeliveryMode::Batch { max_batch_size } => {
                deliver_batch(&inner, &cancel, max_batch_size).await
            }
        };

        match outcome {
            SendOutcome::NoStatements => {
                tokio::select! {
                    () = cancel.cancelled() => {}
                    _ = inner.queue.wait_non_empty_async(IDLE_WAIT) => {}
                }
            }
            SendOutcome::InvalidCredentials => break,
            SendOutcome::Success | SendOutcome::Error => {}
        }
    }
    tracing::debug!(sink = %inner.name, "delivery loop stopped");
    inner.observer.on_stopped_sending(&inner.name);
}

async fn deliver_single(inner: &Arc<AsyncSinkInner>, cancel: &CancellationToken) -> SendOutcome {
    let Some(mut entry) = inner.queue.pop() else {
        return SendOutcome::NoStatements;
    };

    let result = tokio::select! {
        () = cancel.cancelled() => {
            // In-flight statement survives the stop.
            inner.queue.push_front(entry);
            return SendOutcome::Error;
        }
        result = inner.transport.send(entry.statement.clone()) => result,
    };

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
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(delay) => {}
                }
            }
            SendOutcome::Error
        }
    }
}

async fn deliver_batch(
    inner: &Arc<AsyncSinkInner>,
    cancel: &CancellationToken,
    max_batch_size: Option<usize>,
) -> SendOutcome {
    let entries = inner.queue.pop_batch(max_batch_size);
    if entries.is_empty() {
        return SendOutcome::NoStatements;
    }
    let count = entries.len();

    // One spawned send per statement; results land by index.
    let mut join_set = JoinSet::new();
    for (idx, entry) in entries.iter().enumerate() {
        let transport = Arc::clone(&inner.transport);
        let statement = entry.statement.clone();
        join_set.spawn(async move { (idx, transport.send(statement).await) });
    }

    let mut results: Vec<Option<Result<(), SendError>>> =
        std::iter::repeat_with(|| None).take(count).collect();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                // Abort what is still in flight; those entries requeue below.
                join_set.shutdown().await;
                break;
            }
            joined = join_set.join_next() => match joined {
                Some(Ok((idx, result))) => results[idx] = Some(result),
                Some(Err(err)) => {
                    tracing::error!(sink = %inner.name, error = %err, "send task panicked");
                }
                None => break,
            }
        }
    }

    let mut sent = 0u64;
    let mut failed = 0usize;
    let mut batch_error: Option<SendError> = None;
    let mut terminal = false;
    let mut max_attempts = 0;
    let mut requeue_front: Vec<QueueEntry> = Vec::new();

    for (mut entry, result) in entries.into_iter().zip(results) {
        match result {
            Some(Ok(())) => sent += 1,
            Some(Err(err)) if err.is_terminal() => {
                terminal = true;
                batch_error.get_or_insert(err);
                requeue_front.push(entry);
            }
            Some(Err(err)) => {
                failed += 1;
                batch_error.get_or_insert(err);
                entry.attempts += 1;
                if inner.config.retry.exhausted(entry.attempts) {
                    inner.metrics.record_dead_letter();
                    inner.observer.on_dead_letter(&inner.name, &entry.statement);
                    inner.queue.push_dead(entry.statement);
                } else {
                    inner.metrics.record_retry();
                    max_attempts = max_attempts.max(entry.attempts);
                    inner.queue.push_entry(entry);
                }
            }
            // Send never completed (cancelled); attempts unchanged.
            None => requeue_front.push(entry),
        }
    }
    for entry in requeue_front.into_iter().rev() {
        inner.queue.push_front(entry);
    }

    match batch_error {
        None => {
            if sent == count as u64 {
                inner.metrics.record_batch_sent(sent);
                inner.observer.on_sent_batch(&inner.name, count);
                SendOutcome::Success
            } else {
                // Cancelled mid-batch; completed sends still count.
                inner.metrics.record_sent(sent);
                SendOutcome::Error
            }
        }
        Some(err) if terminal => {
            tracing::error!(sink = %inner.name, error = %err, "stopping sink");
            inner.metrics.record_sent(sent);
            *inner.state.lock() = SinkState::Stopped;
            SendOutcome::InvalidCredentials
        }
        Some(err) => {
            tracing::warn!(sink = %inner.name, error = %err, failed, "batch send failed");
            inner.metrics.record_sent(sent);
            inner.metrics.record_batch_failed(failed as u64);
            // One event per failed batch, not one per statement.
            inner.observer.on_failed_sending_batch(&inner.name, failed, &err);
            if max_attempts > 0 {
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(inner.config.retry.delay_for(max_attempts)) => {}
                }
            }
            SendOutcome::Error
        }
    }
}
