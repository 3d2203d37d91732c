//! Statement error types

use thiserror::Error;

/// Errors from statement construction and serialization
#[derive(Debug, Error)]
pub enum StatementError {
    /// Provenance field assigned more than once
    #[error("{field} already assigned for this statement")]
    ProvenanceReassigned {
        /// Which provenance field was reassigned
        field: &'static str,
    },

    /// Serialization to a wire line failed
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
