//! HTTP transport
//!
//! Posts statements as JSON to a collector endpoint with optional bearer
//! authentication. Authentication rejections (401/403) surface as terminal
//! [`SendError::InvalidCredentials`] so the driving sink stops instead of
//! retrying; every other failure is transient.

use std::time::Duration;

use async_trait::async_trait;
use beacon_statement::Statement;

use crate::{AsyncTransport, SendError};

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Collector endpoint URL
    pub endpoint: String,

    /// Bearer token; `None` fails the credential gate
    pub api_key: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpConfig {
    /// Set the collector endpoint URL
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Statement transport over HTTP POST
pub struct HttpTransport {
    config: HttpConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with its own connection pool
    pub fn new(config: HttpConfig) -> Result<Self, SendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| SendError::Network(err.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl AsyncTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn check_credentials(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn send(&self, statement: Statement) -> Result<(), SendError> {
        let body = statement.to_line()?;

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SendError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status.as_u16() {
            401 | 403 => Err(SendError::InvalidCredentials),
            code => Err(SendError::Http(code)),
        }
    }
}
