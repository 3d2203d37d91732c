//! Transport seams for the sink drivers
//!
//! A [`Transport`] performs the actual delivery of statements to a
//! destination. The threaded driver calls it with blocking I/O allowed; the
//! async driver uses [`AsyncTransport`] instead. Drivers own the queue,
//! retry, and lifecycle; transports only move bytes.

use async_trait::async_trait;
use beacon_statement::Statement;

use crate::SendError;

/// Blocking transport used by the threaded [`Sink`] driver
///
/// [`Sink`]: crate::Sink
pub trait Transport: Send {
    /// Transport name for logs and events
    fn name(&self) -> &str;

    /// Whether delivery may proceed
    ///
    /// Checked at loop start and before each cycle; `false` stops the sink
    /// until it is reconfigured and restarted. Defaults to `true` for
    /// transports without credentials (file sinks).
    fn check_credentials(&self) -> bool {
        true
    }

    /// Deliver one statement
    fn send(&mut self, statement: &Statement) -> Result<(), SendError>;

    /// Deliver a batch of statements
    ///
    /// Defaults to sequential `send` calls, failing fast on the first
    /// error. Transports with a native batch form override this.
    fn send_batch(&mut self, statements: &[Statement]) -> Result<(), SendError> {
        for statement in statements {
            self.send(statement)?;
        }
        Ok(())
    }

    /// Called before each batch delivery cycle
    fn before_batch(&mut self) -> Result<(), SendError> {
        Ok(())
    }

    /// Called after a successful batch delivery cycle
    ///
    /// File transports flush buffered rows and rewrite headers here.
    fn after_batch(&mut self) -> Result<(), SendError> {
        Ok(())
    }

    /// Release transport resources; no sends follow
    fn close(&mut self) -> Result<(), SendError> {
        Ok(())
    }
}

/// Non-blocking transport used by the [`AsyncSink`] driver
///
/// [`AsyncSink`]: crate::AsyncSink
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Transport name for logs and events
    fn name(&self) -> &str;

    /// Whether delivery may proceed
    fn check_credentials(&self) -> bool {
        true
    }

    /// Deliver one statement
    ///
    /// Takes ownership so the send can be spawned as its own task when the
    /// driver fans a batch out concurrently.
    async fn send(&self, statement: Statement) -> Result<(), SendError>;

    /// Release transport resources; no sends follow
    async fn close(&self) -> Result<(), SendError> {
        Ok(())
    }
}
