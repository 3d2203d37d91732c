//! Beacon - Sinks
//!
//! Per-sink delivery engine: each sink owns a FIFO queue and a background
//! delivery loop that drains it toward a destination (local file, HTTP
//! endpoint) with retry, backoff, and batching.
//!
//! # Architecture
//!
//! ```text
//! [Pipeline] --enqueue--> [StatementQueue] --> [delivery loop] --> [Transport]
//!                                ^                   |
//!                                +---- requeue on failure (bounded,
//!                                      exponential backoff, dead-letter)
//! ```
//!
//! Two delivery loop variants share the queue and outcome contract:
//!
//! | Driver | Loop | Typical transports |
//! |--------|------|--------------------|
//! | `Sink` | dedicated worker thread | file sinks (blocking I/O) |
//! | `AsyncSink` | tokio task | HTTP and other network transports |
//!
//! The queue waits on a condvar (threaded) or `Notify` (async) with
//! wake-on-enqueue, so an idle sink consumes no CPU.
//!
//! # Example
//!
//! ```ignore
//! use beacon_sinks::{LineFileSink, LineFileConfig, Sink, SinkConfig};
//!
//! let transport = LineFileSink::new(LineFileConfig::default());
//! let sink = Sink::new(SinkConfig::default().with_id("session_log"), Box::new(transport));
//! sink.start_sending();
//! sink.send_statement(statement);
//! sink.stop_sending();
//! ```

// =============================================================================
// Delivery engine
// =============================================================================

/// FIFO statement queue with retry-count entries and dead-letter side queue
mod queue;

/// Threaded sink driver (one worker thread per started sink)
mod sink;

/// Async sink driver (tokio task, tracked in-flight sends)
mod async_sink;

/// Send/transport trait seams
mod transport;

/// Lifecycle/delivery event surface
mod observer;

/// Bounded exponential backoff policy
mod retry;

/// Shared config, metrics, and outcome types
mod common;

/// Sink error types
mod error;

// =============================================================================
// Concrete sinks
// =============================================================================

/// HTTP transport for network delivery
mod http;

/// Line-delimited file transport
mod line_file;

/// Tabular (CSV) file transport with header/data merge
mod tabular_file;

/// File path policy (base dir, session identifier, sharding)
mod path;

// =============================================================================
// Shared utilities
// =============================================================================

/// Buffered writers and the keyed buffer registry
pub mod util;

// =============================================================================
// Public re-exports
// =============================================================================

pub use async_sink::AsyncSink;
pub use common::{DeliveryMode, MetricsSnapshot, SendOutcome, SinkConfig, SinkMetrics, SinkState};
pub use error::SendError;
pub use http::{HttpConfig, HttpTransport};
pub use line_file::{LineFileConfig, LineFileSink};
pub use observer::{NoopObserver, SinkObserver};
pub use path::{BaseDir, FilePathPolicy, ShardMode};
pub use queue::{QueueEntry, StatementQueue};
pub use retry::RetryPolicy;
pub use sink::Sink;
pub use tabular_file::{TabularFileConfig, TabularFileSink};
pub use transport::{AsyncTransport, Transport};
