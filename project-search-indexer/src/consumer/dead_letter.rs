//! Dead-letter producer for events that can never be applied.

use std::time::Duration;

use rdkafka::{
    config::ClientConfig,
    message::{Header, OwnedHeaders},
    producer::{BaseProducer, BaseRecord, Producer},
};
use tracing::{info, warn};

use crate::consumer::messages::RawEvent;
use crate::errors::IngestError;

/// Header carrying the topic the event was read from.
pub const SOURCE_TOPIC_HEADER: &str = "x-source-topic";

/// Header carrying why the event was dead-lettered.
pub const FAILURE_REASON_HEADER: &str = "x-failure-reason";

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Destination for events that can never be applied.
pub trait DeadLetterSink: Send + Sync {
    /// Publish the event, returning only once it is durably accepted.
    fn publish(&self, event: &RawEvent, reason: &str) -> Result<(), IngestError>;

    fn topic(&self) -> &str;
}

/// Publishes raw event payloads to the dead-letter topic.
pub struct DeadLetterProducer {
    producer: BaseProducer,
    topic: String,
}

impl DeadLetterProducer {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, IngestError> {
        let producer: BaseProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", "project-search-indexer-dlq")
            .set("compression.type", "zstd")
            .set("message.timeout.ms", "5000")
            .create()?;

        info!(topic = %topic, "Created dead-letter producer");

        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }
}

impl DeadLetterSink for DeadLetterProducer {
    /// Publish the original payload unchanged and wait for delivery.
    ///
    /// The message is keyed by its source topic so dead letters from one stream stay
    /// ordered.
    fn publish(&self, event: &RawEvent, reason: &str) -> Result<(), IngestError> {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: SOURCE_TOPIC_HEADER,
                value: Some(event.topic.as_str()),
            })
            .insert(Header {
                key: FAILURE_REASON_HEADER,
                value: Some(reason),
            });

        let record = BaseRecord::to(&self.topic)
            .key(event.topic.as_str())
            .payload(&event.payload)
            .headers(headers);

        self.producer.send(record).map_err(|(e, _)| {
            warn!(error = %e, "Failed to enqueue dead letter");
            IngestError::from(e)
        })?;
        self.producer.flush(FLUSH_TIMEOUT)?;
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}
