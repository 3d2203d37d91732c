//! Beacon - Format
//!
//! Dynamic-schema tabular builder used for CSV-style output.
//!
//! # Overview
//!
//! `TabularFormat` accumulates rows whose schema is discovered as data
//! arrives: the header list grows when a row introduces a new field, and
//! rows appended before the growth are rendered back-filled with empty
//! cells at serialization time. This is what lets file sinks write CSV
//! incrementally even though the full column set is only known at the end
//! of a session.
//!
//! # Modules
//!
//! - `tabular` - the `TabularFormat` row/column builder
//! - `csv` - RFC4180 field escaping, field counting, line padding
//! - `filter` - include/exclude regex filtering over header names
//! - `flatten` - nested JSON to dotted-key flattening

pub mod csv;
mod error;
mod filter;
mod flatten;
mod tabular;

pub use error::FormatError;
pub use filter::ColumnFilter;
pub use flatten::flatten_fields;
pub use tabular::TabularFormat;

/// Result type for format operations
pub type Result<T> = std::result::Result<T, FormatError>;
