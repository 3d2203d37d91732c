//! Bounded exponential backoff
//!
//! Transient send failures are retried with exponentially growing delays
//! up to a cap; once `max_attempts` is reached the statement moves to the
//! sink's dead-letter queue instead of cycling forever.

use std::time::Duration;

#[cfg(test)]
#[path = "retry_test.rs"]
mod retry_test;

/// Retry policy for transient send failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts before a statement is dead-lettered
    pub max_attempts: u32,

    /// Delay after the first failure
    pub base_delay: Duration,

    /// Upper bound on the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retrying after `attempts` failed attempts
    ///
    /// Doubles per attempt starting from `base_delay`, capped at
    /// `max_delay`. `attempts` is at least 1 when a failure occurred.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let shift = attempts.saturating_sub(1).min(32);
        let delay = self.base_delay.saturating_mul(1u32 << shift.min(31));
        delay.min(self.max_delay)
    }

    /// Whether a statement with this many failed attempts is exhausted
    #[inline]
    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}
