//! # Project Search Indexer
//!
//! Keeps the project search index in sync with two independent event streams: project
//! lifecycle events and categorization events. Both streams write to the same
//! per-project document, each owning its own group of fields.
//!
//! ## Architecture
//!
//! 1. **Consumer**: Receives raw events from Kafka and commits offsets on acknowledgment
//! 2. **Normalizer**: Turns raw payloads into canonical updates
//! 3. **Merger**: Reads the current document, patches the owned field group, writes it back
//! 4. **Orchestrator**: Drives one event at a time and decides its disposition
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`consumer`]: Kafka consumer and dead-letter producer
//! - [`normalizer`]: Raw event decoding and validation
//! - [`merger`]: Field-ownership aware document merge
//! - [`orchestrator`]: Coordinates the ingest flow
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod errors;
pub mod merger;
pub mod normalizer;
pub mod orchestrator;

pub use config::Dependencies;
pub use errors::IngestError;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
