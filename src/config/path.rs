//! Dot-delimited paths into settings trees and subcomponent trees.

use crate::error::{ConfigError, ConfigResult};
use std::fmt;
use std::str::FromStr;

/// Split a dot-delimited string into its non-empty segments.
///
/// Used directly for subcomponent paths, where zero segments addresses the
/// component itself.
pub fn split_path(raw: &str) -> Vec<String> {
    raw.split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// A non-empty path into a settings tree, e.g. `data.replicas`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dot-delimited path. Fails if no non-empty segment remains.
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        Self::from_segments(split_path(raw)).ok_or_else(|| ConfigError::invalid_path(raw))
    }

    /// Build a path from pre-split segments; `None` when empty.
    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// All segments but the last.
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// The first `depth` segments joined with dots.
    pub fn prefix(&self, depth: usize) -> String {
        self.segments[..depth.min(self.segments.len())].join(".")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for KeyPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
