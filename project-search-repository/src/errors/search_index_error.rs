//! Search index error types.
//!
//! Failures are split into two classes so that upstream layers can tell retryable
//! from non-retryable conditions:
//!
//! - `IndexUnavailable`: connection failures, timeouts and server-side errors
//! - `IndexRequest`: the store rejected the request itself (e.g. a malformed query)

use thiserror::Error;

/// Unified errors from index store operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchIndexError {
    /// The store could not be reached or failed transiently. Safe to retry.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// The store rejected the request. Retrying the same request will fail again.
    #[error("Index request rejected with status {status}: {message}")]
    IndexRequest { status: u16, message: String },

    /// Failed to create the index or its alias.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse a response from the store.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the store.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid input to a gateway operation (e.g. an empty document id).
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl SearchIndexError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::IndexUnavailable(msg.into())
    }

    /// Create a rejected-request error.
    pub fn request(status: u16, msg: impl Into<String>) -> Self {
        Self::IndexRequest {
            status,
            message: msg.into(),
        }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Classify a non-success HTTP status returned by the store.
    ///
    /// 5xx and 429 (too many requests) are transient; every other status means the
    /// request itself was rejected.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        if status >= 500 || status == 429 {
            Self::IndexUnavailable(format!("status {}: {}", status, body.into()))
        } else {
            Self::request(status, body)
        }
    }

    /// Returns true if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::IndexUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(SearchIndexError::from_status(503, "down").is_retryable());
        assert!(SearchIndexError::from_status(500, "boom").is_retryable());
        assert!(SearchIndexError::from_status(429, "slow down").is_retryable());

        let rejected = SearchIndexError::from_status(400, "parsing_exception");
        assert!(!rejected.is_retryable());
        assert!(matches!(
            rejected,
            SearchIndexError::IndexRequest { status: 400, .. }
        ));
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(SearchIndexError::unavailable("timeout").is_retryable());
        assert!(!SearchIndexError::parse("bad json").is_retryable());
        assert!(!SearchIndexError::serialization("bad doc").is_retryable());
        assert!(!SearchIndexError::validation("empty id").is_retryable());
    }
}
