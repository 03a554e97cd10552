//! Errors returned by the read path.

use thiserror::Error;

use super::SearchIndexError;

/// Errors returned to callers of the search and lookup operations.
///
/// None of these are retried internally; the caller receives the typed error and decides.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    /// The request parameters are invalid (user input error).
    #[error("Invalid search parameters: {0}")]
    InvalidSearchParameters(String),

    /// No document exists for the requested id.
    #[error("Project not found: {0}")]
    NotFound(String),

    /// The index store failed or rejected the request.
    #[error(transparent)]
    Index(#[from] SearchIndexError),
}

impl SearchError {
    /// Create an invalid parameters error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidSearchParameters(msg.into())
    }

    /// Create a not found error for a project id.
    pub fn not_found(project_id: impl Into<String>) -> Self {
        Self::NotFound(project_id.into())
    }
}
