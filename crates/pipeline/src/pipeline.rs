//! Pipeline assembly and the submit path

use beacon_hooks::{Hook, HookChain};
use beacon_sinks::{AsyncSink, Sink};
use beacon_statement::Statement;

use crate::{PipelineMetrics, PipelineSnapshot};

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

/// Hook chain plus registered sinks
///
/// Built once via [`PipelineBuilder`]; the set of hooks and sinks is fixed
/// for the pipeline's lifetime. Submission is `&self` and thread-safe.
pub struct Pipeline {
    hooks: HookChain,
    sinks: Vec<Sink>,
    async_sinks: Vec<AsyncSink>,
    metrics: PipelineMetrics,
}

impl Pipeline {
    /// Run a statement through the hooks and fan it out
    ///
    /// Disabled sinks are skipped; enabled ones each receive their own
    /// clone and queue it independently of their delivery state.
    pub fn submit(&self, statement: Statement) {
        self.metrics.record_received();

        let Some(statement) = self.hooks.apply(statement) else {
            tracing::trace!("statement discarded before fan-out");
            self.metrics.record_discarded();
            return;
        };

        for sink in &self.sinks {
            if sink.enabled() {
                sink.send_statement(statement.clone());
            }
        }
        for sink in &self.async_sinks {
            if sink.enabled() {
                sink.send_statement(statement.clone());
            }
        }
        self.metrics.record_delivered();
    }

    /// Start delivery on every enabled sink
    ///
    /// Async sinks require a tokio runtime to be current.
    pub fn start_sending(&self) {
        for sink in &self.sinks {
            sink.start_sending();
        }
        for sink in &self.async_sinks {
            sink.start_sending();
        }
    }

    /// Pause delivery on every sink; queues keep filling
    pub fn pause_sending(&self) {
        for sink in &self.sinks {
            sink.pause_sending();
        }
        for sink in &self.async_sinks {
            sink.pause_sending();
        }
    }

    /// Stop delivery on every sink, retaining their queues
    pub fn stop_sending(&self) {
        for sink in &self.sinks {
            sink.stop_sending();
        }
        for sink in &self.async_sinks {
            sink.stop_sending();
        }
    }

    /// Stop every sink and release transport resources
    ///
    /// Errors are logged per sink rather than aborting the shutdown; every
    /// sink gets its chance to close.
    pub async fn close(&self) {
        for sink in &self.sinks {
            if let Err(err) = sink.close() {
                tracing::error!(sink = sink.name(), error = %err, "close failed");
            }
        }
        for sink in &self.async_sinks {
            if let Err(err) = sink.close().await {
                tracing::error!(sink = sink.name(), error = %err, "close failed");
            }
        }
    }

    /// Registered threaded sinks
    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    /// Registered async sinks
    pub fn async_sinks(&self) -> &[AsyncSink] {
        &self.async_sinks
    }

    /// Look up a threaded sink by id
    pub fn sink(&self, name: &str) -> Option<&Sink> {
        self.sinks.iter().find(|sink| sink.name() == name)
    }

    /// Look up an async sink by id
    pub fn async_sink(&self, name: &str) -> Option<&AsyncSink> {
        self.async_sinks.iter().find(|sink| sink.name() == name)
    }

    /// The hook chain
    pub fn hooks(&self) -> &HookChain {
        &self.hooks
    }

    /// Point-in-time submit-path counters
    pub fn metrics(&self) -> PipelineSnapshot {
        self.metrics.snapshot()
    }
}

/// Explicit pipeline assembly
///
/// Hooks apply in registration order; sinks receive fan-out in
/// registration order.
#[derive(Default)]
pub struct PipelineBuilder {
    hooks: Vec<Box<dyn Hook>>,
    sinks: Vec<Sink>,
    async_sinks: Vec<AsyncSink>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("hooks", &self.hooks.len())
            .field("sinks", &self.sinks.len())
            .field("async_sinks", &self.async_sinks.len())
            .finish()
    }
}

impl PipelineBuilder {
    /// Start an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook at the end of the chain
    #[must_use]
    pub fn hook(mut self, hook: Box<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Register a threaded sink
    #[must_use]
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Register an async sink
    #[must_use]
    pub fn async_sink(mut self, sink: AsyncSink) -> Self {
        self.async_sinks.push(sink);
        self
    }

    /// Assemble the pipeline
    pub fn build(self) -> Pipeline {
        tracing::info!(
            hooks = self.hooks.len(),
            sinks = self.sinks.len() + self.async_sinks.len(),
            "pipeline assembled"
        );
        Pipeline {
            hooks: HookChain::new(self.hooks),
            sinks: self.sinks,
            async_sinks: self.async_sinks,
            metrics: PipelineMetrics::new(),
        }
    }
}
