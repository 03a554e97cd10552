// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

use project_search_repository::ProjectSearchService;

use crate::config::create_cors_layer;
use crate::errors::ApiError;
pub use self::state::AppState;

/// Create the Axum application router with all routes and middleware
pub fn create_app(service: ProjectSearchService) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/projects/search", post(handlers::search_handler))
        .route("/projects/:id", get(handlers::get_project_handler))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

/// Run the server on the specified address until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ApiError> {
    info!("Server listening on {}", addr);
    info!("- Search endpoint: http://{}/projects/search", addr);
    info!("- Lookup endpoint: http://{}/projects/:id", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await
        .map_err(|e| ApiError::ServerError(e.to_string()))
}
