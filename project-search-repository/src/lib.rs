//! # Project Search Repository
//!
//! This crate provides the index access gateway for the project search index and the
//! read path built on top of it. It includes:
//!
//! - [`SearchIndexProvider`]: the get/upsert/delete/search contract with the store
//! - [`OpenSearchProvider`] and [`InMemoryProvider`]: concrete gateways
//! - [`query`]: translation of a search request into a boolean query tree
//! - [`mapper`]: conversion of raw hits into the external response shape
//! - [`ProjectSearchService`]: search and lookup-by-id for callers

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod mapper;
pub mod memory;
pub mod opensearch;
pub mod query;
pub mod service;
pub mod types;
pub mod utils;

pub use config::SearchServiceConfig;
pub use errors::{SearchError, SearchIndexError};
pub use interfaces::SearchIndexProvider;
pub use memory::InMemoryProvider;
pub use opensearch::OpenSearchProvider;
pub use query::IndexQuery;
pub use service::ProjectSearchService;
pub use types::{SearchHit, SearchHits};
pub use utils::parse_project_id;
