//! Result types returned by the index gateway.

use project_search_shared::ProjectDocument;

/// A single raw hit from the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The stored document.
    pub document: ProjectDocument,
    /// Relevance score, when the store computed one.
    pub score: Option<f64>,
}

/// One page of raw hits plus the total number of matching documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchHits {
    pub hits: Vec<SearchHit>,
    pub total: u64,
}
