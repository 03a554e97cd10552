//! # Project Search API
//!
//! HTTP surface of the project search read path. Every request goes through
//! [`ProjectSearchService`](project_search_repository::ProjectSearchService); the API
//! holds no state of its own.
//!
//! ## Routes
//!
//! - `POST /projects/search`: structured search, returns one page of results
//! - `GET /projects/:id`: lookup of a single project by id
//! - `GET /health`: liveness check

pub mod config;
pub mod errors;
pub mod server;

pub use config::ApiConfig;
pub use errors::ApiError;
pub use server::{create_app, run_server, AppState};
