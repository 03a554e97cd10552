// App state for the Axum server
use project_search_repository::ProjectSearchService;

#[derive(Clone)]
pub struct AppState {
    pub service: ProjectSearchService,
}
