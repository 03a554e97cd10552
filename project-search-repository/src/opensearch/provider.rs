//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsAliasParts},
    DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use project_search_shared::ProjectDocument;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::query::IndexQuery;
use crate::types::{SearchHit, SearchHits};

/// OpenSearch provider implementation.
///
/// All document operations go through the configured alias, so a reindex into a new
/// versioned index only needs the alias to be moved.
///
/// # Example
///
/// ```ignore
/// use project_search_repository::opensearch::IndexConfig;
/// let config = IndexConfig::new("projects", 0);
/// let provider = OpenSearchProvider::new("http://localhost:9200", config).await?;
///
/// provider.ensure_index_exists().await?;
/// provider.upsert_document(&document).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and version
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or the cluster cannot be reached
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let provider = Self {
            client: OpenSearch::new(transport),
            index_config,
        };
        provider.ping().await?;

        info!(
            url = %url,
            alias = %provider.index_config.alias,
            version = provider.index_config.version,
            "Created OpenSearch provider"
        );

        Ok(provider)
    }

    /// Check that the cluster answers.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::from_status(status.as_u16(), "ping failed"));
        }
        Ok(())
    }

    pub fn index_config(&self) -> &IndexConfig {
        &self.index_config
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Create the versioned index with its mapping and alias, unless the alias exists.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let alias = self.index_config.alias.as_str();

        let response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        if response.status_code().is_success() {
            debug!(alias = %alias, "Index alias already exists");
            return Ok(());
        }

        let index_name = self.index_config.index_name();
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(get_index_settings(alias))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!(index = %index_name, alias = %alias, "Created search index");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        // Another instance won the race to create it
        if body.contains("resource_already_exists_exception") {
            warn!(index = %index_name, "Search index already exists");
            return Ok(());
        }

        error!(status = %status, body = %body, "Index creation failed");
        Err(SearchIndexError::index_creation(format!(
            "Creating {} failed with status {}: {}",
            index_name, status, body
        )))
    }

    async fn get_document(&self, id: &str) -> Result<Option<ProjectDocument>, SearchIndexError> {
        let response = self
            .client
            .get(GetParts::IndexId(&self.index_config.alias, id))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        if response.status_code().as_u16() == 404 {
            debug!(doc_id = %id, "Document not found");
            return Ok(None);
        }

        let body = check_status(response, "Get").await?;
        parse_get_response(body)
    }

    async fn upsert_document(&self, document: &ProjectDocument) -> Result<(), SearchIndexError> {
        if document.id.trim().is_empty() {
            return Err(SearchIndexError::validation("document id is required"));
        }

        let body = serde_json::to_value(document)
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        // Index API replaces the whole source, so no stale field survives
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_config.alias, &document.id))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        check_status(response, "Upsert").await?;
        debug!(doc_id = %document.id, "Document upserted");
        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_config.alias, id))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        // 404 is acceptable - document may not exist
        if response.status_code().as_u16() == 404 {
            debug!(doc_id = %id, "Document already absent");
            return Ok(());
        }

        check_status(response, "Delete").await?;
        debug!(doc_id = %id, "Document deleted");
        Ok(())
    }

    async fn search(&self, query: &IndexQuery) -> Result<SearchHits, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.index_config.alias.as_str()]))
            .body(query.to_search_body())
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let body = check_status(response, "Search").await?;
        parse_search_response(body)
    }
}

/// Turn a non-success response into a classified error, or decode the JSON body.
async fn check_status(response: Response, operation: &str) -> Result<Value, SearchIndexError> {
    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(operation = operation, status = %status, body = %body, "Request failed");
        return Err(SearchIndexError::from_status(status.as_u16(), body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| SearchIndexError::parse(e.to_string()))
}

/// Extract the stored document from a get response.
fn parse_get_response(body: Value) -> Result<Option<ProjectDocument>, SearchIndexError> {
    if body["found"] == Value::Bool(false) {
        return Ok(None);
    }
    let source = body
        .get("_source")
        .cloned()
        .ok_or_else(|| SearchIndexError::parse("get response has no _source"))?;
    serde_json::from_value(source)
        .map(Some)
        .map_err(|e| SearchIndexError::parse(e.to_string()))
}

/// Extract hits, scores and the total match count from a search response.
fn parse_search_response(body: Value) -> Result<SearchHits, SearchIndexError> {
    let hits = &body["hits"];
    let total = hits["total"]["value"]
        .as_u64()
        .or_else(|| hits["total"].as_u64())
        .ok_or_else(|| SearchIndexError::parse("search response has no hits.total"))?;

    let raw_hits = hits["hits"]
        .as_array()
        .ok_or_else(|| SearchIndexError::parse("search response has no hits.hits"))?;

    let hits = raw_hits
        .iter()
        .map(|hit| {
            let document = serde_json::from_value(hit["_source"].clone())
                .map_err(|e| SearchIndexError::parse(e.to_string()))?;
            Ok(SearchHit {
                document,
                score: hit["_score"].as_f64(),
            })
        })
        .collect::<Result<Vec<_>, SearchIndexError>>()?;

    Ok(SearchHits { hits, total })
}
