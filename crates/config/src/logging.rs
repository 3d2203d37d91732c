//! Logging configuration
//!
//! Thin wrapper over `tracing-subscriber`: a level floor, an output
//! format, and an optional env-filter directive string. `RUST_LOG` always
//! wins over the configured level.

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;

/// Minimum level emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Line layout of emitted events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default single-line format
    #[default]
    Full,

    /// Abbreviated single-line format
    Compact,

    /// Multi-line human-oriented format
    Pretty,
}

/// Logging section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level when no filter overrides it
    pub level: LogLevel,

    /// Line layout
    pub format: LogFormat,

    /// Raw env-filter directives (e.g. `"info,beacon_sinks=debug"`)
    pub filter: Option<String>,
}

impl LogConfig {
    /// Install the global tracing subscriber
    ///
    /// Idempotent: a second call logs nothing and leaves the first
    /// subscriber in place.
    pub fn init(&self) {
        let directives = self
            .filter
            .clone()
            .unwrap_or_else(|| self.level.as_str().to_string());
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directives));

        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let result = match self.format {
            LogFormat::Full => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
        };
        if result.is_ok() {
            tracing::debug!(level = self.level.as_str(), "logging initialized");
        }
    }
}
