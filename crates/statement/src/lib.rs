//! Beacon - Statement
//!
//! The unit analytic event record flowing through the delivery pipeline.
//!
//! # Overview
//!
//! A `Statement` carries an author-defined JSON payload plus provenance:
//! the `origin` tag of the raw event source, the `Composer` that produced
//! it, and the tracking source that owns it. Statements are created by a
//! Composer, transformed by hooks, and consumed (serialized) by sinks.
//!
//! # Invariants
//!
//! - `composer` and `owner` are assigned exactly once, before the statement
//!   leaves the composer, and never reassigned.
//! - `discard()` is monotonic: once discarded, a statement never re-enters
//!   the pipeline.
//! - `clone()` yields a value-independent copy, so one hook's mutation is
//!   never visible through another hook's view.

mod composer;
mod error;
mod statement;

pub use composer::{Composer, ComposerRef};
pub use error::StatementError;
pub use statement::Statement;

/// Result type for statement operations
pub type Result<T> = std::result::Result<T, StatementError>;
