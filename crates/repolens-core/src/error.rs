//! Error types for repository analysis.

use thiserror::Error;

/// Errors that can occur during analysis or diffing.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Transient fetch failure from the remote host, safe to retry.
    #[error("Transient fetch error at {path}: {message}")]
    TransientFetch { path: String, message: String },

    /// An operation exceeded its per-chunk timeout.
    #[error("Operation {operation} timed out after {timeout_ms} ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Remote host rejected the credentials. Never retried.
    #[error("Authentication rejected: {message}")]
    Auth { message: String },

    /// Malformed repository coordinates. No crawl is attempted.
    #[error("Invalid repository coordinates: {message}")]
    Validation { message: String },

    /// A requested snapshot or diff target does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Diff history retention quota reached for this repository.
    #[error("Diff history quota reached ({limit}) for {repository}")]
    QuotaExceeded { repository: String, limit: usize },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl AnalyzeError {
    /// Create a transient fetch error with path context.
    pub fn transient(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransientFetch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an other error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether the retry executor may re-attempt the failed operation.
    ///
    /// Auth, validation, not-found and quota errors bypass retry and
    /// propagate immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientFetch { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classes() {
        assert!(AnalyzeError::transient("src", "connection reset").is_retryable());
        assert!(
            AnalyzeError::Timeout {
                operation: "list:src:0".into(),
                timeout_ms: 30_000,
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_classes() {
        assert!(
            !AnalyzeError::Auth {
                message: "bad token".into()
            }
            .is_retryable()
        );
        assert!(!AnalyzeError::validation("empty owner").is_retryable());
        assert!(!AnalyzeError::not_found("snapshot acme/app@abc").is_retryable());
        assert!(
            !AnalyzeError::QuotaExceeded {
                repository: "acme/app".into(),
                limit: 3,
            }
            .is_retryable()
        );
    }
}
