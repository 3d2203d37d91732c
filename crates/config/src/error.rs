//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or applying configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has the wrong shape
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A column include/exclude pattern failed to compile
    #[error(transparent)]
    Filter(#[from] beacon_format::FormatError),

    /// A declared sink could not be constructed
    #[error("sink {name}: {reason}")]
    Sink { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
