//! Core data structures shared by the indexer, the repository and the API.

pub mod project_document;
pub mod search_request;
pub mod search_response;
