//! Credential resolution
//!
//! Network sinks need an endpoint and an API key. Deployments supply them
//! from different places (config file, environment, embedding host), so
//! resolution walks an ordered list of sources and the first one that
//! produces a complete pair wins. Resolution is a pure read: sources are
//! never mutated, nothing is cached, and the same list resolves the same
//! way every time.

use std::env;

use serde::Deserialize;

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;

/// A complete endpoint/key pair for a network sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Collector endpoint URL
    pub endpoint: String,

    /// API key sent as a bearer token
    pub key: String,
}

/// One place credentials may come from
pub trait CredentialSource {
    /// Source name for logs
    fn name(&self) -> &str;

    /// The credentials this source holds, if complete
    fn resolve(&self) -> Option<Credentials>;
}

/// Resolve against an ordered source list, first complete pair wins
pub fn resolve_credentials(sources: &[Box<dyn CredentialSource>]) -> Option<Credentials> {
    for source in sources {
        if let Some(credentials) = source.resolve() {
            tracing::debug!(source = source.name(), "credentials resolved");
            return Some(credentials);
        }
    }
    tracing::debug!("no credential source produced a complete pair");
    None
}

/// Fixed credentials supplied by the embedding application
#[derive(Debug, Clone)]
pub struct StaticSource {
    credentials: Credentials,
}

impl StaticSource {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                endpoint: endpoint.into(),
                key: key.into(),
            },
        }
    }
}

impl CredentialSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn resolve(&self) -> Option<Credentials> {
        Some(self.credentials.clone())
    }
}

/// Credentials read from environment variables
#[derive(Debug, Clone)]
pub struct EnvSource {
    endpoint_var: String,
    key_var: String,
}

impl Default for EnvSource {
    fn default() -> Self {
        Self {
            endpoint_var: "BEACON_ENDPOINT".to_string(),
            key_var: "BEACON_API_KEY".to_string(),
        }
    }
}

impl EnvSource {
    /// Read from custom variable names
    pub fn new(endpoint_var: impl Into<String>, key_var: impl Into<String>) -> Self {
        Self {
            endpoint_var: endpoint_var.into(),
            key_var: key_var.into(),
        }
    }
}

impl CredentialSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    fn resolve(&self) -> Option<Credentials> {
        let endpoint = env::var(&self.endpoint_var).ok()?;
        let key = env::var(&self.key_var).ok()?;
        Some(Credentials { endpoint, key })
    }
}

/// Credentials section of the config file
///
/// Both fields must be present for this source to resolve; a lone endpoint
/// or key defers to the next source in the list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsSpec {
    pub endpoint: Option<String>,
    pub key: Option<String>,
}

impl CredentialSource for CredentialsSpec {
    fn name(&self) -> &str {
        "config"
    }

    fn resolve(&self) -> Option<Credentials> {
        Some(Credentials {
            endpoint: self.endpoint.clone()?,
            key: self.key.clone()?,
        })
    }
}
