//! Environment-driven settings for the API server.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

use crate::errors::ApiError;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default deadline for one gateway round-trip, in milliseconds.
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 5000;

const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";
const DEFAULT_INDEX_ALIAS: &str = "projects";

/// Which index gateway backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    OpenSearch,
    /// Local development without a cluster; starts empty.
    Memory,
}

/// Settings read at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub search_timeout: Duration,
    pub opensearch_url: String,
    pub index_alias: String,
    pub index_version: u32,
    pub backend: SearchBackend,
}

impl ApiConfig {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `API_BIND_ADDR`: listen address (default: 0.0.0.0:8080)
    /// - `SEARCH_TIMEOUT_MS`: gateway deadline per request (default: 5000)
    /// - `OPENSEARCH_URL`, `INDEX_ALIAS`, `PROJECTS_INDEX_VERSION`: index location
    /// - `SEARCH_BACKEND`: "opensearch" (default) or "memory"
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = value("API_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ApiError::config(format!("Invalid API_BIND_ADDR: {}", e)))?;

        let search_timeout_ms = match value("SEARCH_TIMEOUT_MS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|e| ApiError::config(format!("Invalid SEARCH_TIMEOUT_MS: {}", e)))?,
            None => DEFAULT_SEARCH_TIMEOUT_MS,
        };

        let backend = match value("SEARCH_BACKEND").map(|v| v.to_lowercase()).as_deref() {
            None | Some("opensearch") => SearchBackend::OpenSearch,
            Some("memory") => SearchBackend::Memory,
            Some(other) => {
                return Err(ApiError::config(format!("Unknown SEARCH_BACKEND: {}", other)))
            }
        };

        Ok(Self {
            bind_addr,
            search_timeout: Duration::from_millis(search_timeout_ms),
            opensearch_url: value("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            index_alias: value("INDEX_ALIAS").unwrap_or_else(|| DEFAULT_INDEX_ALIAS.to_string()),
            index_version: value("PROJECTS_INDEX_VERSION")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            backend,
        })
    }
}

/// CORS layer for browser clients.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ApiError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.search_timeout, Duration::from_millis(5000));
        assert_eq!(config.index_alias, "projects");
        assert_eq!(config.backend, SearchBackend::OpenSearch);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("API_BIND_ADDR", "127.0.0.1:9000"),
            ("SEARCH_TIMEOUT_MS", "250"),
            ("SEARCH_BACKEND", "Memory"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.search_timeout, Duration::from_millis(250));
        assert_eq!(config.backend, SearchBackend::Memory);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config(&[("API_BIND_ADDR", "nowhere")]),
            Err(ApiError::ConfigError(_))
        ));
        assert!(matches!(
            config(&[("SEARCH_TIMEOUT_MS", "soon")]),
            Err(ApiError::ConfigError(_))
        ));
        assert!(matches!(
            config(&[("SEARCH_BACKEND", "sqlite")]),
            Err(ApiError::ConfigError(_))
        ));
    }
}
