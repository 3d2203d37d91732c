//! Format error types

use thiserror::Error;

/// Errors from tabular format operations
#[derive(Debug, Error)]
pub enum FormatError {
    /// Referenced header does not exist
    #[error("unknown header: {0}")]
    UnknownHeader(String),

    /// Header name already in use
    #[error("duplicate header: {0}")]
    DuplicateHeader(String),

    /// Invalid include/exclude pattern
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),
}
