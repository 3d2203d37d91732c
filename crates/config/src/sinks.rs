//! Declarative sink configuration
//!
//! The `[sinks.<name>]` table declares each sink with a `type` tag plus the
//! type's own fields; shared fields (`enabled`, `batching`, retry knobs)
//! are accepted on every type. Specs convert into the runtime config types
//! of `beacon_sinks`.
//!
//! ```toml
//! [sinks.session_log]
//! type = "line_file"
//! base_dir = "documents"
//! identifier = "session-{%Y%m%d-%H%M%S}"
//!
//! [sinks.gaze_csv]
//! type = "tabular_file"
//! sharding = "per_composer"
//! exclude = "^debug\\."
//! batching = 64
//!
//! [sinks.collector]
//! type = "http"
//! endpoint = "https://collector.example/statements"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use beacon_format::ColumnFilter;
use beacon_sinks::{
    BaseDir, FilePathPolicy, HttpConfig, RetryPolicy, ShardMode, SinkConfig,
};
use serde::Deserialize;

use crate::{ConfigError, Credentials};

#[cfg(test)]
#[path = "sinks_test.rs"]
mod sinks_test;

fn default_true() -> bool {
    true
}

fn default_identifier() -> String {
    "session-{%Y%m%d-%H%M%S}".to_string()
}

fn default_extension() -> String {
    "jsonl".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// One declared sink, tagged by type
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkSpec {
    LineFile(LineFileSpec),
    TabularFile(TabularFileSpec),
    Http(HttpSinkSpec),
}

impl SinkSpec {
    /// Shared fields of this spec
    pub fn common(&self) -> &CommonSpec {
        match self {
            Self::LineFile(spec) => &spec.common,
            Self::TabularFile(spec) => &spec.common,
            Self::Http(spec) => &spec.common,
        }
    }
}

/// Fields accepted on every sink type
#[derive(Debug, Clone, Deserialize)]
pub struct CommonSpec {
    /// Whether this sink participates in fan-out
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Batch size per delivery cycle; `0` drains the whole queue
    #[serde(default)]
    pub batching: Option<usize>,

    /// Retry/backoff overrides
    #[serde(default)]
    pub retry: Option<RetrySpec>,
}

impl Default for CommonSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            batching: None,
            retry: None,
        }
    }
}

impl CommonSpec {
    /// Build the runtime sink config under the given id
    pub fn sink_config(&self, id: &str) -> SinkConfig {
        let mut config = SinkConfig::default().with_id(id);
        config.enabled = self.enabled;
        if let Some(batching) = self.batching {
            let cap = if batching == 0 { None } else { Some(batching) };
            config = config.with_batching(cap);
        }
        if let Some(retry) = &self.retry {
            config = config.with_retry(retry.policy());
        }
        config
    }
}

/// Retry knobs, all optional with the engine defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrySpec {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

impl RetrySpec {
    /// Build the runtime retry policy, filling gaps from the defaults
    pub fn policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            base_delay: self
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            max_delay: self
                .max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
        }
    }
}

/// Well-known base directory names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseDirSpec {
    #[default]
    Temp,
    Desktop,
    Documents,
    Home,
}

/// File grouping names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardSpec {
    #[default]
    Session,
    PerComposer,
}

/// Location fields shared by the file sink types
#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    /// Well-known base directory; ignored when `directory` is set
    #[serde(default)]
    pub base_dir: BaseDirSpec,

    /// Explicit output directory
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Session identifier template (`{...}` segments expand as strftime)
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// One file per session, or one per composer
    #[serde(default)]
    pub sharding: ShardSpec,
}

impl Default for FileSpec {
    fn default() -> Self {
        Self {
            base_dir: BaseDirSpec::Temp,
            directory: None,
            identifier: default_identifier(),
            sharding: ShardSpec::Session,
        }
    }
}

impl FileSpec {
    /// Resolve into a runtime path policy (session identifier included)
    pub fn path_policy(&self) -> FilePathPolicy {
        let base = match &self.directory {
            Some(directory) => BaseDir::Custom(directory.clone()),
            None => match self.base_dir {
                BaseDirSpec::Temp => BaseDir::Temp,
                BaseDirSpec::Desktop => BaseDir::Desktop,
                BaseDirSpec::Documents => BaseDir::Documents,
                BaseDirSpec::Home => BaseDir::Home,
            },
        };
        let shard = match self.sharding {
            ShardSpec::Session => ShardMode::Session,
            ShardSpec::PerComposer => ShardMode::PerComposer,
        };
        FilePathPolicy::new(base, &self.identifier, shard)
    }
}

/// Line-delimited file sink declaration
#[derive(Debug, Clone, Deserialize)]
pub struct LineFileSpec {
    #[serde(flatten)]
    pub file: FileSpec,

    /// File extension without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(flatten)]
    pub common: CommonSpec,
}

/// Tabular (CSV) file sink declaration
#[derive(Debug, Clone, Deserialize)]
pub struct TabularFileSpec {
    #[serde(flatten)]
    pub file: FileSpec,

    /// Regex admitting column names
    #[serde(default)]
    pub include: Option<String>,

    /// Regex rejecting column names (wins over include)
    #[serde(default)]
    pub exclude: Option<String>,

    /// Whether nested payload JSON flattens into dotted columns
    #[serde(default = "default_true")]
    pub flatten: bool,

    #[serde(flatten)]
    pub common: CommonSpec,
}

impl TabularFileSpec {
    /// Compile the include/exclude patterns
    pub fn column_filter(&self) -> Result<ColumnFilter, ConfigError> {
        Ok(ColumnFilter::new(
            self.include.as_deref(),
            self.exclude.as_deref(),
        )?)
    }
}

/// HTTP sink declaration
///
/// Endpoint and key may be omitted here and supplied through credential
/// resolution instead.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSinkSpec {
    /// Collector endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(flatten)]
    pub common: CommonSpec,
}

impl HttpSinkSpec {
    /// Build the transport config, falling back to resolved credentials
    ///
    /// Spec fields win over the resolved pair field by field.
    pub fn http_config(&self, resolved: Option<&Credentials>) -> HttpConfig {
        let mut config = HttpConfig::default().with_timeout(Duration::from_secs(self.timeout_secs));
        config.endpoint = self
            .endpoint
            .clone()
            .or_else(|| resolved.map(|c| c.endpoint.clone()))
            .unwrap_or_default();
        config.api_key = self
            .api_key
            .clone()
            .or_else(|| resolved.map(|c| c.key.clone()));
        config
    }
}
