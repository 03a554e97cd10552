//! Search index provider trait definition.
//!
//! This module defines the abstract interface for index store operations,
//! allowing for different backend implementations (OpenSearch, in-memory, etc.).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::query::IndexQuery;
use crate::types::SearchHits;
use project_search_shared::ProjectDocument;

/// Abstracts the underlying index store (OpenSearch, in-memory, etc.).
///
/// This is the only component that performs I/O against the store. Both the write path
/// (merge engine) and the read path (`ProjectSearchService`) go through it.
///
/// Implementations translate store-specific failures into
/// [`SearchIndexError::IndexUnavailable`] (transient) or
/// [`SearchIndexError::IndexRequest`] (rejected) so callers can decide whether to retry.
///
/// # Atomicity
///
/// `upsert_document` and `delete_document` are expected to be atomic per document.
/// No locking or version check is performed on top of that.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the index and its alias exist, creating them if necessary.
    ///
    /// This method should be called during application startup.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Fetch a document by project id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(doc))` - If the document exists
    /// * `Ok(None)` - If no document exists for the id (a miss is not an error)
    /// * `Err(SearchIndexError)` - If the lookup fails
    async fn get_document(&self, id: &str) -> Result<Option<ProjectDocument>, SearchIndexError>;

    /// Create or replace a document by id.
    ///
    /// The stored document is replaced as a whole; fields absent from `document` do not
    /// survive from a previous version.
    async fn upsert_document(&self, document: &ProjectDocument) -> Result<(), SearchIndexError>;

    /// Delete a document by id.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    async fn delete_document(&self, id: &str) -> Result<(), SearchIndexError>;

    /// Execute a query and return one page of hits with the total match count.
    async fn search(&self, query: &IndexQuery) -> Result<SearchHits, SearchIndexError>;
}
