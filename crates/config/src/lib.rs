//! Beacon - Config
//!
//! TOML configuration for the delivery pipeline: a logging section, an
//! optional credentials section, and one `[sinks.<name>]` table per sink.
//!
//! # Example
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [credentials]
//! endpoint = "https://collector.example/statements"
//!
//! [sinks.session_log]
//! type = "line_file"
//! base_dir = "documents"
//!
//! [sinks.gaze_csv]
//! type = "tabular_file"
//! sharding = "per_composer"
//! batching = 64
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

mod credentials;
mod error;
mod logging;
mod sinks;

pub use credentials::{
    resolve_credentials, CredentialSource, Credentials, CredentialsSpec, EnvSource, StaticSource,
};
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use sinks::{
    BaseDirSpec, CommonSpec, FileSpec, HttpSinkSpec, LineFileSpec, RetrySpec, ShardSpec, SinkSpec,
    TabularFileSpec,
};

#[cfg(test)]
#[path = "lib_test.rs"]
mod lib_test;

/// Root of the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging setup
    pub logging: LogConfig,

    /// Credentials declared in the file (one source among several)
    pub credentials: CredentialsSpec,

    /// Declared sinks, keyed by sink id
    pub sinks: BTreeMap<String, SinkSpec>,
}

impl Config {
    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Declared sinks that are enabled
    pub fn enabled_sinks(&self) -> impl Iterator<Item = (&str, &SinkSpec)> {
        self.sinks
            .iter()
            .filter(|(_, spec)| spec.common().enabled)
            .map(|(name, spec)| (name.as_str(), spec))
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
