//! Structured error types for configuration operations.

use serde::Serialize;
use std::path::Path;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Caller errors
    InvalidPath,
    KeyNotAllowed,

    // Lookup errors
    PathNotFound,
    KeyNotFound,

    // Shape errors
    TypeConflict,

    // Storage errors
    Io,
    Serialization,
}

/// Structured error returned by every fallible configuration operation.
///
/// `path` is the deepest sub-path that was resolved (or that conflicted) when
/// the operation stopped, `target` the full path the caller asked for.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ConfigError {
    pub code: ErrorCode,
    pub message: String,
    pub path: Option<String>,
    pub target: Option<String>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConfigError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            target: None,
            source: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors

    pub fn invalid_path(raw: &str) -> Self {
        Self::new(
            ErrorCode::InvalidPath,
            format!("'{}' is not a valid config path; at least one key is required", raw),
        )
        .with_target(raw)
    }

    /// A segment of `target` that must be a map holds a scalar.
    pub fn type_conflict(path: &str, target: &str, action: &str) -> Self {
        Self::new(
            ErrorCode::TypeConflict,
            format!(
                "Config path '{}' points to a non-map value; unable to {} '{}'",
                path, action, target
            ),
        )
        .with_path(path)
        .with_target(target)
    }

    /// An intermediate key on the way to `target` does not exist.
    pub fn key_path_not_found(path: &str, target: &str) -> Self {
        Self::new(
            ErrorCode::KeyNotFound,
            format!(
                "Config key path '{}' not found; unable to remove config entry '{}'",
                path, target
            ),
        )
        .with_path(path)
        .with_target(target)
    }

    /// The final key of `target` does not exist.
    pub fn key_not_found(key: &str, target: &str) -> Self {
        Self::new(
            ErrorCode::KeyNotFound,
            format!(
                "Target key '{}' does not exist in config; unable to remove '{}'",
                key, target
            ),
        )
        .with_path(key)
        .with_target(target)
    }

    pub fn subcomponent_not_found(name: &str, path: &str, target: &str) -> Self {
        Self::new(
            ErrorCode::PathNotFound,
            format!(
                "Subcomponent '{}' not found at '{}'; unable to resolve component configuration '{}'",
                name, path, target
            ),
        )
        .with_path(path)
        .with_target(target)
    }

    pub fn key_not_allowed(target: &str, subcomponent: &str) -> Self {
        let scope = if subcomponent.is_empty() {
            "the component".to_string()
        } else {
            format!("subcomponent '{}'", subcomponent)
        };
        Self::new(
            ErrorCode::KeyNotAllowed,
            format!(
                "New config keys are not allowed; '{}' does not exist in {}",
                target, scope
            ),
        )
        .with_target(target)
    }

    pub fn io(file: &Path, err: std::io::Error) -> Self {
        Self::new(
            ErrorCode::Io,
            format!("Failed to access {}: {}", file.display(), err),
        )
        .with_target(file.display().to_string())
        .with_source(err)
    }

    pub fn serialization(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(
            ErrorCode::Serialization,
            format!("Failed to serialize component configuration: {}", err),
        )
        .with_source(err)
    }

    /// A stored file exists for `environment` but could not be decoded, so
    /// writing would replace content that was never read.
    pub fn undecodable(location: &Path, environment: &str, detail: &str) -> Self {
        Self::new(
            ErrorCode::Serialization,
            format!(
                "Config for environment '{}' in {} could not be decoded ({}); refusing to overwrite it",
                environment,
                location.display(),
                detail
            ),
        )
        .with_target(environment)
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
