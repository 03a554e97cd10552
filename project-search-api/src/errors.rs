//! Error types for the API and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use project_search_repository::{SearchError, SearchIndexError};

/// Errors that can occur while starting the API or serving a request.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request body could not be read as a search request.
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// Error from the search service.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The server failed to bind or serve.
    #[error("Server error: {0}")]
    ServerError(String),
}

impl ApiError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// The status code this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Search(SearchError::InvalidSearchParameters(_)) => StatusCode::BAD_REQUEST,
            ApiError::Search(SearchError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Search(SearchError::Index(SearchIndexError::IndexUnavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Search(SearchError::Index(_))
            | ApiError::ConfigError(_)
            | ApiError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SearchIndexError> for ApiError {
    fn from(err: SearchIndexError) -> Self {
        Self::Search(SearchError::Index(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }

        (
            status,
            Json(serde_json::json!({
                "status": "error",
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(SearchError::invalid("size")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SearchError::not_found("p-1")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(SearchIndexError::unavailable("timed out")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(SearchIndexError::request(400, "bad query")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(SearchIndexError::parse("no hits")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
