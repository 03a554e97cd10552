//! Project search API entry point.
//!
//! Serves search and lookup requests over the project search index.

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use project_search_api::config::SearchBackend;
use project_search_api::{create_app, run_server, ApiConfig, ApiError};
use project_search_repository::opensearch::IndexConfig;
use project_search_repository::{
    InMemoryProvider, OpenSearchProvider, ProjectSearchService, SearchIndexProvider,
    SearchServiceConfig,
};

fn init_tracing() -> Result<(), ApiError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("project_search_api=info,project_search_repository=info,tower_http=info")
    });

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| ApiError::config(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| ApiError::config(e.to_string()))?;
    }

    info!(
        service_name = "project-search-api",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );

    Ok(())
}

async fn build_provider(config: &ApiConfig) -> Result<Arc<dyn SearchIndexProvider>, ApiError> {
    match config.backend {
        SearchBackend::Memory => {
            info!("Using in-memory search backend");
            Ok(Arc::new(InMemoryProvider::new()))
        }
        SearchBackend::OpenSearch => {
            let index_config = IndexConfig::new(config.index_alias.clone(), config.index_version);
            let provider = OpenSearchProvider::new(&config.opensearch_url, index_config).await?;
            provider.ensure_index_exists().await?;
            Ok(Arc::new(provider))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize tracing
    init_tracing()?;

    let config = ApiConfig::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        opensearch_url = %config.opensearch_url,
        search_timeout_ms = config.search_timeout.as_millis() as u64,
        backend = ?config.backend,
        "Starting project search API"
    );

    // Initialize search backend
    let provider = match build_provider(&config).await {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "Failed to initialize search backend");
            return Err(e);
        }
    };

    let service = ProjectSearchService::with_config(
        provider,
        SearchServiceConfig::with_timeout(config.search_timeout),
    );

    run_server(create_app(service), config.bind_addr).await
}
