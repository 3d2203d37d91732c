//! Sink error types

use thiserror::Error;

/// Errors from a single send attempt
///
/// `InvalidCredentials` is terminal for the sink: the delivery loop stops
/// and requires reconfiguration plus a restart. Everything else is treated
/// as transient and retried under the sink's [`RetryPolicy`].
///
/// [`RetryPolicy`]: crate::RetryPolicy
#[derive(Debug, Error)]
pub enum SendError {
    /// Credentials missing or rejected by the destination
    #[error("invalid credentials")]
    InvalidCredentials,

    /// I/O error while writing to a file sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Statement could not be serialized for the wire
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Network-level failure (connect, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Destination answered with a non-success HTTP status
    #[error("http status {0}")]
    Http(u16),
}

impl SendError {
    /// Whether this error stops the sink instead of retrying
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }
}

impl From<beacon_statement::StatementError> for SendError {
    fn from(err: beacon_statement::StatementError) -> Self {
        Self::Serialization(err.to_string())
    }
}
