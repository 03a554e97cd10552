//! # Project Search Shared
//!
//! This crate defines shared data structures used across the project search ecosystem:
//! the indexed project document with its two owned field groups, the search request
//! and the search response.

pub mod types;

pub use types::project_document::{CategorizationFields, ProjectDocument, ProjectFields};
pub use types::search_request::{
    ProjectSearchRequest, SortDirection, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use types::search_response::{ProjectResponse, ProjectSearchResponse};
