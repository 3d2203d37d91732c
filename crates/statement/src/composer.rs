//! Composer collaborator interface
//!
//! A composer turns raw scene events (gaze, head, input) into statements.
//! The pipeline never depends on concrete composers - it only needs a
//! stable name and identity for provenance and per-composer file sharding.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::Statement;

/// Process-wide composer identity counter
static NEXT_COMPOSER_ID: AtomicU64 = AtomicU64::new(1);

/// Component that produces statements from raw source events
///
/// Implementors live outside the delivery core. The pipeline consumes them
/// only through this narrow surface.
pub trait Composer: Send + Sync {
    /// Logical name of this composer (used for per-composer file sharding)
    fn name(&self) -> &str;
}

/// Cheap, cloneable identity of a composer
///
/// Statements carry a `ComposerRef` rather than the composer itself so that
/// cloning a statement never clones producer state. The numeric id is unique
/// per process and serves as the sharding key for per-composer file output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerRef {
    name: Arc<str>,
    id: u64,
}

impl ComposerRef {
    /// Create a new composer identity with a fresh process-unique id
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            id: NEXT_COMPOSER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The composer's logical name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique identity, used as the per-composer shard key
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Create a statement stamped with this composer's provenance
    ///
    /// The composer field is assigned here, exactly once, before the
    /// statement is visible to the rest of the pipeline.
    pub fn compose(
        &self,
        origin: impl Into<String>,
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Statement {
        let mut statement = Statement::with_payload(origin, payload);
        // Fresh statement, so the single assignment cannot fail.
        let _ = statement.set_composer(self.clone());
        statement
    }
}

impl std::fmt::Display for ComposerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composer_ref_ids_are_unique() {
        let a = ComposerRef::new("gaze");
        let b = ComposerRef::new("gaze");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn test_compose_stamps_provenance() {
        let composer = ComposerRef::new("head");
        let statement = composer.compose("hmd", serde_json::Map::new());

        let stamped = statement.composer().expect("composer should be set");
        assert_eq!(stamped.name(), "head");
        assert_eq!(stamped.id(), composer.id());
    }

    #[test]
    fn test_display_includes_name_and_id() {
        let composer = ComposerRef::new("input");
        let rendered = composer.to_string();
        assert!(rendered.starts_with("input#"));
    }
}
