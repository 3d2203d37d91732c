//! Include/exclude filtering over header names
//!
//! Filtering is applied both when new headers are admitted and again at
//! serialization time, so a single `TabularFormat` can be rendered with
//! different column subsets without rebuilding its data.

use regex::Regex;

use crate::FormatError;

/// Regex-based include/exclude filter over header names
///
/// A name passes when it matches the include pattern (or none is set) and
/// does not match the exclude pattern.
#[derive(Debug, Clone, Default)]
pub struct ColumnFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl ColumnFilter {
    /// Filter that admits every name
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Build a filter from optional include/exclude patterns
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> crate::Result<Self> {
        Ok(Self {
            include: include.map(Regex::new).transpose()?,
            exclude: exclude.map(Regex::new).transpose()?,
        })
    }

    /// Whether a header name passes this filter
    pub fn allows(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(name) {
                return false;
            }
        }
        true
    }

    /// Whether this filter admits every name unconditionally
    pub fn is_open(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}

impl TryFrom<(&str, &str)> for ColumnFilter {
    type Error = FormatError;

    fn try_from((include, exclude): (&str, &str)) -> crate::Result<Self> {
        Self::new(Some(include), Some(exclude))
    }
}
