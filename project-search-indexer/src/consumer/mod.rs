//! Consumer module for the project search indexer ingest.
//!
//! Provides Kafka consumer functionality for receiving project and categorization
//! events, and the dead-letter producer for events that can never be applied.

mod dead_letter;
mod kafka_consumer;
mod messages;

pub use dead_letter::{DeadLetterProducer, DeadLetterSink};
pub use kafka_consumer::{KafkaConsumer, KafkaConsumerConfig};
pub use messages::{
    CategorizationEventMessage, Disposition, EventStream, ProjectEventMessage, RawEvent,
    StreamMessage,
};
