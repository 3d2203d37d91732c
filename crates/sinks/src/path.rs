//! File path policy for the file sinks
//!
//! Resolves where on disk a statement lands: a base directory, a
//! per-session identifier (with optional strftime templating), and a shard
//! mode that keeps either one file per session or one file per composer.

use std::env;
use std::path::PathBuf;

use beacon_statement::Statement;
use chrono::format::{Item, StrftimeItems};
use chrono::Utc;

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

/// Shard key used when a statement carries no composer
const UNSHARDED_KEY: u64 = 0;

/// File name used for statements without a composer in per-composer mode
const UNKNOWN_COMPOSER: &str = "Unknown";

/// Well-known base directories for file output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseDir {
    /// OS temp directory
    Temp,

    /// User desktop
    Desktop,

    /// User documents
    Documents,

    /// User home directory
    Home,

    /// Explicit directory
    Custom(PathBuf),
}

impl BaseDir {
    /// Resolve to a concrete directory
    ///
    /// User directories that cannot be determined fall back to the OS temp
    /// directory so file sinks always have somewhere to write.
    pub fn resolve(&self) -> PathBuf {
        match self {
            Self::Temp => env::temp_dir(),
            Self::Desktop => dirs::desktop_dir().unwrap_or_else(env::temp_dir),
            Self::Documents => dirs::document_dir().unwrap_or_else(env::temp_dir),
            Self::Home => dirs::home_dir().unwrap_or_else(env::temp_dir),
            Self::Custom(path) => path.clone(),
        }
    }
}

/// How statements are grouped into files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardMode {
    /// One file per session
    Session,

    /// One file per composer, grouped under a session directory
    PerComposer,
}

/// Where a file sink writes, resolved once per session
#[derive(Debug, Clone)]
pub struct FilePathPolicy {
    base: PathBuf,
    session_id: String,
    shard: ShardMode,
}

impl FilePathPolicy {
    /// Resolve a policy from a base directory and identifier template
    ///
    /// The identifier is resolved exactly once, so timestamped templates
    /// name one session consistently for the sink's whole lifetime.
    pub fn new(base: BaseDir, identifier: &str, shard: ShardMode) -> Self {
        Self {
            base: base.resolve(),
            session_id: resolve_session_identifier(identifier),
            shard,
        }
    }

    /// The resolved session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The shard mode
    pub fn shard(&self) -> ShardMode {
        self.shard
    }

    /// Registry key grouping this statement with its file
    ///
    /// Session mode maps everything to one key; per-composer mode keys by
    /// the composer's process-unique id, with composerless statements
    /// sharing the zero key.
    pub fn shard_key(&self, statement: &Statement) -> u64 {
        match self.shard {
            ShardMode::Session => UNSHARDED_KEY,
            ShardMode::PerComposer => statement
                .composer()
                .map(|composer| composer.id())
                .unwrap_or(UNSHARDED_KEY),
        }
    }

    /// File path for this statement's shard
    ///
    /// Session mode: `base/<session_id>.<ext>`. Per-composer mode:
    /// `base/<session_id>/<composer>.<ext>`, with `Unknown` for
    /// composerless statements.
    pub fn shard_path(&self, statement: &Statement, extension: &str) -> PathBuf {
        match self.shard {
            ShardMode::Session => self
                .base
                .join(format!("{}.{extension}", self.session_id)),
            ShardMode::PerComposer => {
                let composer = statement
                    .composer()
                    .map(|composer| sanitize_file_name(composer.name()))
                    .unwrap_or_else(|| UNKNOWN_COMPOSER.to_string());
                self.base
                    .join(&self.session_id)
                    .join(format!("{composer}.{extension}"))
            }
        }
    }
}

/// Expand `{strftime}` segments in a session identifier template
///
/// Each brace-delimited segment is formatted against the current UTC time;
/// segments that are not valid strftime patterns are kept verbatim (without
/// the braces). Text outside braces passes through unchanged.
pub fn resolve_session_identifier(template: &str) -> String {
    let now = Utc::now();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // Unbalanced brace, keep the tail as-is.
            out.push_str(&rest[open..]);
            return out;
        };
        let pattern = &after[..close];
        match format_strftime(&now, pattern) {
            Some(formatted) => out.push_str(&formatted),
            None => out.push_str(pattern),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Format `pattern` as strftime, returning `None` if it is not valid
fn format_strftime(now: &chrono::DateTime<Utc>, pattern: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(now.format_with_items(items.into_iter()).to_string())
}

/// Replace path-hostile characters in a file name component
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if sanitized.is_empty() {
        UNKNOWN_COMPOSER.to_string()
    } else {
        sanitized
    }
}
