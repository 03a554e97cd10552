//! Dependency initialization and wiring for the project search indexer.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use project_search_repository::opensearch::IndexConfig;
use project_search_repository::{OpenSearchProvider, SearchIndexProvider};

use crate::config::settings::{ConnectionMode, IndexerConfig};
use crate::consumer::KafkaConsumer;
use crate::merger::DocumentMerger;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`IndexerConfig::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails (only in fail-fast mode for OpenSearch)
    pub async fn new() -> Result<Self, IndexingError> {
        Self::from_config(IndexerConfig::from_env()).await
    }

    /// Initialize all dependencies from explicit settings.
    pub async fn from_config(config: IndexerConfig) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %config.opensearch_url,
            kafka_broker = %config.kafka.brokers,
            kafka_group_id = %config.kafka.group_id,
            connection_mode = ?config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        // Connect to OpenSearch
        let index_config = IndexConfig::new(config.index_alias.clone(), config.index_version);

        let search_provider = Self::connect_to_opensearch(
            &config.opensearch_url,
            index_config,
            config.connection_mode,
            config.retry_interval,
        )
        .await?;

        info!("OpenSearch connection established");

        // Exits if index and alias cannot be created
        search_provider
            .ensure_index_exists()
            .await
            .map_err(|e| IndexingError::config(format!("Failed to ensure index exists: {}", e)))?;

        // Initialize Kafka consumer
        let consumer = KafkaConsumer::new(&config.kafka).map_err(|e| {
            IndexingError::config(format!("Failed to create Kafka consumer: {}", e))
        })?;

        info!("Kafka consumer created");

        // Wire the merger and orchestrator
        let merger = DocumentMerger::new(Arc::new(search_provider));

        let orchestrator = Orchestrator::with_config(
            Arc::new(consumer),
            merger,
            OrchestratorConfig {
                retry_attempts: config.index_retry_attempts,
                ..Default::default()
            },
        );

        Ok(Self { orchestrator })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, IndexingError> {
        loop {
            match OpenSearchProvider::new(url, index_config.clone()).await {
                Ok(provider) => return Ok(provider),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(IndexingError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}
