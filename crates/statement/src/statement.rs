//! The statement record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{ComposerRef, StatementError};

#[cfg(test)]
#[path = "statement_test.rs"]
mod statement_test;

/// One analytic event flowing through the pipeline
///
/// The payload is an opaque, author-defined JSON object. Provenance fields
/// (`origin`, `composer`, `owner`) identify where the event came from;
/// `discarded` marks statements filtered out by the hook chain.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Author-defined fields
    payload: Map<String, Value>,

    /// Provenance tag of the raw event source
    origin: String,

    /// Producing composer, set exactly once
    composer: Option<ComposerRef>,

    /// Originating tracking source, set exactly once
    owner: Option<Arc<str>>,

    /// Monotonic discard flag (true-only transition)
    discarded: bool,

    /// Creation time
    timestamp: DateTime<Utc>,
}

/// Wire shape of a line-delimited statement record
#[derive(Serialize, Deserialize)]
struct WireStatement {
    timestamp: DateTime<Utc>,
    origin: String,
    payload: Map<String, Value>,
}

impl Statement {
    /// Create an empty statement with the given origin tag
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_payload(origin, Map::new())
    }

    /// Create a statement with an initial payload
    pub fn with_payload(origin: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            payload,
            origin: origin.into(),
            composer: None,
            owner: None,
            discarded: false,
            timestamp: Utc::now(),
        }
    }

    /// The author-defined payload fields
    #[inline]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Set a payload field, replacing any previous value
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        self.payload.insert(key.into(), value);
    }

    /// Look up a payload field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// The origin provenance tag
    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The producing composer, if assigned
    #[inline]
    pub fn composer(&self) -> Option<&ComposerRef> {
        self.composer.as_ref()
    }

    /// Assign the producing composer
    ///
    /// Fails if a composer was already assigned; provenance is written
    /// exactly once, before the statement leaves the composer.
    pub fn set_composer(&mut self, composer: ComposerRef) -> crate::Result<()> {
        if self.composer.is_some() {
            return Err(StatementError::ProvenanceReassigned { field: "composer" });
        }
        self.composer = Some(composer);
        Ok(())
    }

    /// The originating tracking source, if assigned
    #[inline]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Assign the originating tracking source (exactly once)
    pub fn set_owner(&mut self, owner: impl Into<Arc<str>>) -> crate::Result<()> {
        if self.owner.is_some() {
            return Err(StatementError::ProvenanceReassigned { field: "owner" });
        }
        self.owner = Some(owner.into());
        Ok(())
    }

    /// Whether this statement has been discarded by a hook
    #[inline]
    pub fn discarded(&self) -> bool {
        self.discarded
    }

    /// Discard this statement
    ///
    /// Monotonic: there is no way to un-discard. The pipeline drops
    /// discarded statements before fan-out and sinks refuse to queue them.
    pub fn discard(&mut self) {
        self.discarded = true;
    }

    /// Creation timestamp (UTC)
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Override the creation timestamp
    ///
    /// Composers replaying recorded sessions stamp historical times.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = timestamp;
    }

    /// Serialize to one line-delimited JSON record (no trailing newline)
    pub fn to_line(&self) -> crate::Result<String> {
        let wire = WireStatement {
            timestamp: self.timestamp,
            origin: self.origin.clone(),
            payload: self.payload.clone(),
        };
        Ok(serde_json::to_string(&wire)?)
    }

    /// Parse a statement back from a line-delimited record
    ///
    /// Provenance references (composer, owner) are process-local and do not
    /// survive the round trip; payload, origin, and timestamp do.
    pub fn from_line(line: &str) -> crate::Result<Self> {
        let wire: WireStatement = serde_json::from_str(line)?;
        let mut statement = Self::with_payload(wire.origin, wire.payload);
        statement.timestamp = wire.timestamp;
        Ok(statement)
    }

    /// Fields for tabular output: origin and timestamp first, then payload
    ///
    /// The envelope columns lead so that every tabular file starts with the
    /// same stable columns regardless of payload shape.
    pub fn row_fields(&self) -> Map<String, Value> {
        let mut fields = Map::with_capacity(self.payload.len() + 2);
        fields.insert(
            "timestamp".into(),
            Value::String(self.timestamp.to_rfc3339()),
        );
        fields.insert("origin".into(), Value::String(self.origin.clone()));
        for (key, value) in &self.payload {
            fields.insert(key.clone(), value.clone());
        }
        fields
    }
}
