//! Configuration and dependency wiring for the project search indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{ConnectionMode, IndexerConfig};
