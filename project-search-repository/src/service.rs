//! Read-path service for the project search index.
//!
//! `ProjectSearchService` validates a search request, builds the query, runs it through
//! the index gateway under the caller's deadline and maps the raw hits into the external
//! response shape. It holds no state between requests and never retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use project_search_shared::{ProjectResponse, ProjectSearchRequest, ProjectSearchResponse};

use crate::config::SearchServiceConfig;
use crate::errors::{SearchError, SearchIndexError};
use crate::interfaces::SearchIndexProvider;
use crate::mapper;
use crate::query;
use crate::utils::parse_project_id;

/// Search and lookup over the project search index.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use project_search_repository::{InMemoryProvider, ProjectSearchService};
/// use project_search_shared::ProjectSearchRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = ProjectSearchService::new(Arc::new(InMemoryProvider::new()));
///
/// let page = service.search(&ProjectSearchRequest::term("designer")).await?;
/// println!("{} of {} projects", page.len(), page.total_elements);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProjectSearchService {
    provider: Arc<dyn SearchIndexProvider>,
    config: SearchServiceConfig,
}

impl ProjectSearchService {
    /// Create a service with the default gateway deadline.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(provider, SearchServiceConfig::default())
    }

    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: SearchServiceConfig) -> Self {
        Self { provider, config }
    }

    /// Run a search using the configured deadline.
    ///
    /// # Returns
    ///
    /// * `Ok(ProjectSearchResponse)` - One page of results, possibly empty
    /// * `Err(SearchError::InvalidSearchParameters)` - If the request fails validation
    /// * `Err(SearchError::Index)` - If the gateway failed or the deadline expired
    pub async fn search(
        &self,
        request: &ProjectSearchRequest,
    ) -> Result<ProjectSearchResponse, SearchError> {
        self.search_within(request, self.config.search_timeout).await
    }

    /// Run a search, bounding the gateway round-trip by `deadline`.
    #[instrument(skip(self, request), fields(page = request.page, size = request.size))]
    pub async fn search_within(
        &self,
        request: &ProjectSearchRequest,
        deadline: Duration,
    ) -> Result<ProjectSearchResponse, SearchError> {
        let query = query::build(request)?;

        let hits = timeout(deadline, self.provider.search(&query))
            .await
            .map_err(|_| {
                warn!(deadline_ms = deadline.as_millis() as u64, "Search timed out");
                SearchIndexError::unavailable("timed out")
            })??;

        debug!(total = hits.total, returned = hits.hits.len(), "Search completed");
        Ok(mapper::map(hits, request))
    }

    /// Look up a single project by id.
    ///
    /// # Returns
    ///
    /// * `Ok(ProjectResponse)` - The mapped document, without a score
    /// * `Err(SearchError::InvalidSearchParameters)` - If the id is not a valid UUID
    /// * `Err(SearchError::NotFound)` - If no document exists for the id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<ProjectResponse, SearchError> {
        let id = parse_project_id(id).map_err(|e| SearchError::invalid(e.to_string()))?;

        let document = timeout(self.config.search_timeout, self.provider.get_document(&id))
            .await
            .map_err(|_| SearchIndexError::unavailable("timed out"))??;

        match document {
            Some(document) => Ok(mapper::to_project_response(document, None)),
            None => Err(SearchError::not_found(id)),
        }
    }
}
