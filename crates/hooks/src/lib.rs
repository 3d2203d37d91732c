//! Beacon - Hooks
//!
//! Ordered transform/filter steps applied to a statement before fan-out.
//!
//! # Overview
//!
//! Hooks run sequentially: each receives the output of the previous one and
//! may enrich fields, rewrite values, or discard the statement entirely.
//! A discarded statement never reaches any sink.
//!
//! ```text
//! [Statement] → [Hook 1] → [Hook 2] → ... → [Statement'] or discarded
//! ```
//!
//! # Design Principles
//!
//! - **Value-replacing**: a hook takes the statement by value and returns
//!   it (possibly rebuilt), so hooks never observe each other mid-mutation
//! - **Fast**: hooks run on the submit path and must not block on I/O
//! - **Zero-cost when empty**: an empty chain is a boolean check
//!
//! # Example
//!
//! ```ignore
//! use beacon_hooks::{Hook, HookChain};
//!
//! let chain = HookChain::new(vec![Box::new(ScrubNames), Box::new(DropIdle)]);
//! match chain.apply(statement) {
//!     Some(statement) => fan_out(statement),
//!     None => {} // discarded
//! }
//! ```

mod chain;

pub use chain::HookChain;

use beacon_statement::Statement;

/// A transform/filter step applied to statements before delivery
///
/// Implementors must be `Send + Sync`; the chain may be shared across the
/// submitting thread and tests.
pub trait Hook: Send + Sync {
    /// Transform a statement, returning the (possibly replaced) value
    ///
    /// To filter a statement out, call [`Statement::discard`] on it before
    /// returning; the chain stops at the first discarded result.
    fn apply(&self, statement: Statement) -> Statement;

    /// Name of this hook for logging
    fn name(&self) -> &'static str;

    /// Whether this hook is currently enabled
    ///
    /// Disabled hooks are filtered out of chains at construction time.
    fn enabled(&self) -> bool {
        true
    }
}
