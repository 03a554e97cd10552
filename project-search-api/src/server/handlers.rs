// HTTP request handlers
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{debug, info};

use project_search_shared::{ProjectResponse, ProjectSearchRequest, ProjectSearchResponse};

use crate::errors::ApiError;
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Search endpoint - runs a structured search and returns one page of projects
pub async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProjectSearchRequest>, JsonRejection>,
) -> Result<Json<ProjectSearchResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    debug!(
        search_term = ?request.search_term,
        page = request.page,
        size = request.size,
        "Received search request"
    );

    let response = state.service.search(&request).await?;

    info!(
        total_elements = response.total_elements,
        returned = response.len(),
        "Search served"
    );
    Ok(Json(response))
}

/// Lookup endpoint - returns a single project by id
pub async fn get_project_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = state.service.find_by_id(&id).await?;
    Ok(Json(project))
}
