//! Hook chain - sequential statement transformation

use crate::Hook;
use beacon_statement::Statement;

#[cfg(test)]
#[path = "chain_test.rs"]
mod chain_test;

/// Chain of hooks applied sequentially
///
/// Hooks are applied in the order they were added. If any hook discards the
/// statement, the chain stops and the statement is dropped.
pub struct HookChain {
    /// Ordered list of hooks
    hooks: Vec<Box<dyn Hook>>,

    /// Whether any hooks are active
    enabled: bool,
}

impl HookChain {
    /// Create a new hook chain
    ///
    /// Only enabled hooks are included. If all hooks are disabled, the
    /// chain is a no-op.
    pub fn new(hooks: Vec<Box<dyn Hook>>) -> Self {
        let active: Vec<_> = hooks.into_iter().filter(|h| h.enabled()).collect();
        let enabled = !active.is_empty();

        Self {
            hooks: active,
            enabled,
        }
    }

    /// Create an empty chain (no-op)
    pub fn empty() -> Self {
        Self {
            hooks: Vec::new(),
            enabled: false,
        }
    }

    /// Check if the chain has any active hooks
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the number of active hooks
    #[inline]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if the chain is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Get the names of all active hooks
    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Apply all hooks in sequence
    ///
    /// Returns `None` if any hook discarded the statement; the remaining
    /// hooks are not run in that case. A statement already discarded on
    /// entry is dropped without running any hook.
    pub fn apply(&self, statement: Statement) -> Option<Statement> {
        if statement.discarded() {
            return None;
        }

        // Fast path: no hooks enabled
        if !self.enabled {
            return Some(statement);
        }

        let mut current = statement;

        for hook in &self.hooks {
            current = hook.apply(current);
            if current.discarded() {
                tracing::trace!(hook = hook.name(), "statement discarded by hook");
                return None;
            }
        }

        Some(current)
    }

    /// Get a hook by name
    pub fn get(&self, name: &str) -> Option<&dyn Hook> {
        self.hooks
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.as_ref())
    }
}

impl Default for HookChain {
    fn default() -> Self {
        Self::empty()
    }
}
