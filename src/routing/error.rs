//! Routing error definitions.

use thiserror::Error;

/// Errors produced by route registration and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No registered pattern matches the path for this method.
    #[error("no route for {method} {path}")]
    NotFound { method: String, path: String },

    /// The pattern is malformed and was not registered.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A different pattern already terminates at the same trie position.
    #[error("pattern {pattern:?} conflicts with {existing:?} for {method}")]
    Conflict {
        method: String,
        existing: String,
        pattern: String,
    },
}

impl RouteError {
    pub(crate) fn not_found(method: &str, path: &str) -> Self {
        Self::NotFound {
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true for the lookup failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
