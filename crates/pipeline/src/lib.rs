//! Beacon - Pipeline
//!
//! The delivery front door: statements submitted here run through the hook
//! chain once, then fan out to every enabled registered sink.
//!
//! # Architecture
//!
//! ```text
//!                          +-> [Sink "session_log"]  (thread)
//! submit -> [HookChain] ---+-> [Sink "gaze_csv"]     (thread)
//!                          +-> [AsyncSink "http"]    (tokio task)
//! ```
//!
//! Hooks see each statement exactly once, before any sink; a discarded
//! statement reaches no sink at all. Each sink receives its own clone and
//! queues it independently, so one slow destination never backs up the
//! others.
//!
//! Registration is explicit through [`PipelineBuilder`]; nothing attaches
//! to a pipeline implicitly.
//!
//! # Example
//!
//! ```ignore
//! use beacon_pipeline::PipelineBuilder;
//!
//! let pipeline = PipelineBuilder::new()
//!     .hook(Box::new(ScrubNames))
//!     .sink(file_sink)
//!     .async_sink(http_sink)
//!     .build();
//!
//! pipeline.start_sending();
//! pipeline.submit(statement);
//! pipeline.stop_sending();
//! ```

mod assemble;
mod metrics;
mod pipeline;

pub use assemble::from_config;
pub use metrics::{PipelineMetrics, PipelineSnapshot};
pub use pipeline::{Pipeline, PipelineBuilder};
