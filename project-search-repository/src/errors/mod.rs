//! Error types for the project search repository.
//!
//! `SearchIndexError` covers failures talking to the index store; `SearchError` is
//! what the read path returns to callers.

mod search_error;
mod search_index_error;

pub use search_error::SearchError;
pub use search_index_error::SearchIndexError;
