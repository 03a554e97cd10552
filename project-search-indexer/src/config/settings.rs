//! Environment-driven settings for the project search indexer.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::consumer::KafkaConsumerConfig;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default index alias.
const DEFAULT_INDEX_ALIAS: &str = "projects";

/// Default Kafka broker address.
const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "project-search-indexer";

/// Default topic for project lifecycle events.
const DEFAULT_PROJECT_EVENTS_TOPIC: &str = "projects.events";

/// Default topic for categorization events.
const DEFAULT_CATEGORIZATION_EVENTS_TOPIC: &str = "projects.categorization";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Default number of retries of a transient index failure per event.
const DEFAULT_INDEX_RETRY_ATTEMPTS: usize = 3;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode. Valid values are "fail-fast" and "retry"
    /// (case-insensitive); anything else falls back to "retry".
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// All settings the indexer reads at startup.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub opensearch_url: String,
    pub index_alias: String,
    pub index_version: u32,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub kafka: KafkaConsumerConfig,
    pub index_retry_attempts: usize,
}

impl IndexerConfig {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_ALIAS`: Index alias name (default: "projects")
    /// - `PROJECTS_INDEX_VERSION`: Index version number (default: 0)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `KAFKA_BROKER`: Kafka broker address (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: project-search-indexer)
    /// - `PROJECT_EVENTS_TOPIC`: Project event topic (default: projects.events)
    /// - `CATEGORIZATION_EVENTS_TOPIC`: Categorization topic (default: projects.categorization)
    /// - `DEAD_LETTER_TOPIC`: Dead-letter topic (default: unset, dead letters are only logged)
    /// - `INDEX_RETRY_ATTEMPTS`: Retries of a transient index failure (default: 3)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            opensearch_url: string("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            index_alias: string("INDEX_ALIAS", DEFAULT_INDEX_ALIAS),
            index_version: lookup("PROJECTS_INDEX_VERSION")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            connection_mode: ConnectionMode::parse(
                lookup("OPENSEARCH_CONNECTION_MODE").as_deref(),
            ),
            retry_interval: Duration::from_secs(
                lookup("OPENSEARCH_RETRY_INTERVAL_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS),
            ),
            kafka: KafkaConsumerConfig {
                brokers: string("KAFKA_BROKER", DEFAULT_KAFKA_BROKER),
                group_id: string("KAFKA_GROUP_ID", DEFAULT_KAFKA_GROUP_ID),
                project_topic: string("PROJECT_EVENTS_TOPIC", DEFAULT_PROJECT_EVENTS_TOPIC),
                categorization_topic: string(
                    "CATEGORIZATION_EVENTS_TOPIC",
                    DEFAULT_CATEGORIZATION_EVENTS_TOPIC,
                ),
                dead_letter_topic: lookup("DEAD_LETTER_TOPIC").filter(|v| !v.trim().is_empty()),
            },
            index_retry_attempts: lookup("INDEX_RETRY_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INDEX_RETRY_ATTEMPTS),
        }
    }
}
