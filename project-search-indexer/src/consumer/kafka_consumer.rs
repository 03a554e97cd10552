//! Kafka consumer implementation for the project search indexer.
//!
//! Consumes the project and categorization topics with one consumer, forwards every
//! message as a [`RawEvent`] and commits offsets only once the orchestrator has
//! acknowledged the event.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer as _, StreamConsumer},
    message::Message as KafkaMessage,
    Offset, TopicPartitionList,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::dead_letter::{DeadLetterProducer, DeadLetterSink};
use crate::consumer::messages::{Disposition, EventStream, RawEvent, StreamMessage};
use crate::errors::IngestError;
use crate::orchestrator::Consumer;

/// Connection and topic settings for the Kafka consumer.
#[derive(Debug, Clone)]
pub struct KafkaConsumerConfig {
    /// Kafka broker addresses (comma-separated).
    pub brokers: String,
    pub group_id: String,
    pub project_topic: String,
    pub categorization_topic: String,
    /// Dead letters are only logged when unset.
    pub dead_letter_topic: Option<String>,
}

/// Kafka consumer for project and categorization events.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topics: HashMap<String, EventStream>,
    dead_letters: Option<DeadLetterProducer>,
}

impl KafkaConsumer {
    /// Create a new Kafka consumer.
    ///
    /// Auto-commit is disabled: an offset is committed only after its event has been
    /// processed or dead-lettered.
    ///
    /// # Returns
    ///
    /// * `Ok(KafkaConsumer)` - A new consumer instance
    /// * `Err(IngestError)` - If consumer or producer creation fails
    pub fn new(config: &KafkaConsumerConfig) -> Result<Self, IngestError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        let dead_letters = config
            .dead_letter_topic
            .as_deref()
            .map(|topic| DeadLetterProducer::new(&config.brokers, topic))
            .transpose()?;

        let topics = HashMap::from([
            (config.project_topic.clone(), EventStream::Project),
            (
                config.categorization_topic.clone(),
                EventStream::Categorization,
            ),
        ]);

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topics = ?topics.keys().collect::<Vec<_>>(),
            dead_letter_topic = ?config.dead_letter_topic,
            "Created Kafka consumer"
        );

        Ok(Self {
            consumer,
            topics,
            dead_letters,
        })
    }

    /// Handle the orchestrator's verdict on one event.
    ///
    /// An error means the event could not be settled; the caller must stop consuming so
    /// no later offset on the partition is committed past it.
    fn acknowledge(&self, event: &RawEvent, disposition: &Disposition) -> Result<(), IngestError> {
        let sink = self.dead_letters.as_ref().map(|p| p as &dyn DeadLetterSink);
        if settle(event, disposition, sink)? == Settlement::Commit {
            self.commit_or_log(event);
        }
        Ok(())
    }

    fn commit_or_log(&self, event: &RawEvent) {
        match self.commit_offset(&event.topic, event.partition, event.offset) {
            Ok(()) => debug!(
                topic = %event.topic,
                partition = event.partition,
                offset = event.offset,
                "Committed offset"
            ),
            Err(e) => error!(error = %e, "Failed to commit offset after acknowledgment"),
        }
    }

    /// Commit the position after `offset`.
    fn commit_offset(&self, topic: &str, partition: i32, offset: i64) -> Result<(), IngestError> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(topic, partition, Offset::Offset(offset + 1))?;
        self.consumer.commit(&tpl, CommitMode::Async)?;
        Ok(())
    }
}

/// What happens to an event's offset once its disposition is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    Commit,
    /// Leave uncommitted so the event is redelivered after a restart.
    Hold,
}

/// Carry out a disposition, publishing dead letters first.
///
/// A failed dead-letter publish is returned as an error rather than held: commits are
/// cumulative, so the next processed event would commit past it.
fn settle(
    event: &RawEvent,
    disposition: &Disposition,
    dead_letters: Option<&dyn DeadLetterSink>,
) -> Result<Settlement, IngestError> {
    match disposition {
        Disposition::Processed => Ok(Settlement::Commit),
        Disposition::DeadLetter { reason } => {
            match dead_letters {
                Some(sink) => {
                    sink.publish(event, reason).map_err(|e| {
                        error!(
                            topic = %event.topic,
                            partition = event.partition,
                            offset = event.offset,
                            error = %e,
                            "Failed to publish dead letter"
                        );
                        e
                    })?;
                    warn!(
                        topic = %event.topic,
                        partition = event.partition,
                        offset = event.offset,
                        dead_letter_topic = %sink.topic(),
                        reason = %reason,
                        "Event dead-lettered"
                    );
                }
                None => warn!(
                    topic = %event.topic,
                    partition = event.partition,
                    offset = event.offset,
                    reason = %reason,
                    "Event dead-lettered (no dead-letter topic configured)"
                ),
            }
            Ok(Settlement::Commit)
        }
        Disposition::Failed { error } => {
            error!(
                topic = %event.topic,
                partition = event.partition,
                offset = event.offset,
                error = %error,
                "Not committing offset due to processing failure"
            );
            Ok(Settlement::Hold)
        }
    }
}

#[async_trait]
impl Consumer for KafkaConsumer {
    /// Subscribe to the project and categorization topics.
    fn subscribe(&self) -> Result<(), IngestError> {
        let topics: Vec<&str> = self.topics.keys().map(|s| s.as_str()).collect();
        self.consumer.subscribe(&topics)?;

        info!(topics = ?topics, "Subscribed to Kafka topics");
        Ok(())
    }

    /// Start consuming messages and send them through the channel.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to send events to
    /// * `ack_receiver` - Channel to receive acknowledgments from the orchestrator
    /// * `shutdown` - Shutdown signal receiver
    #[instrument(skip(self, sender, ack_receiver, shutdown))]
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut ack_receiver: mpsc::UnboundedReceiver<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        let mut message_stream = self.consumer.stream();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    // Unacknowledged events are re-read from the last committed offset
                    let _ = sender.send(StreamMessage::End).await;
                    break;
                }
                ack_msg = ack_receiver.recv() => {
                    match ack_msg {
                        Some(StreamMessage::Acknowledgment { event, disposition }) => {
                            if let Err(e) = self.acknowledge(&event, &disposition) {
                                error!(error = %e, "Stopping consumer before committing past an unsettled event");
                                return Err(e);
                            }
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Acknowledgment channel closed");
                            break;
                        }
                        _ => {}
                    }
                }
                message = message_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            let Some(stream) = self.topics.get(msg.topic()).copied() else {
                                warn!(topic = %msg.topic(), "Message from unexpected topic, skipping");
                                if let Err(e) = self.commit_offset(msg.topic(), msg.partition(), msg.offset()) {
                                    error!(topic = %msg.topic(), error = %e, "Failed to commit skipped message");
                                }
                                continue;
                            };

                            debug!(
                                topic = %msg.topic(),
                                partition = msg.partition(),
                                offset = msg.offset(),
                                stream = %stream,
                                "Received message from Kafka"
                            );

                            let event = RawEvent::new(
                                stream,
                                msg.topic(),
                                msg.partition(),
                                msg.offset(),
                                msg.payload().unwrap_or_default(),
                            );

                            if sender.send(StreamMessage::Event(event)).await.is_err() {
                                info!("Event channel closed");
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka error");
                            let _ = sender.send(StreamMessage::Error(e.to_string())).await;
                        }
                        None => {
                            info!("Kafka stream ended");
                            let _ = sender.send(StreamMessage::End).await;
                            break;
                        }
                    }
                }
            }
        }

        // Acknowledgments already sent still get committed
        while let Ok(msg) = ack_receiver.try_recv() {
            if let StreamMessage::Acknowledgment { event, disposition } = msg {
                self.acknowledge(&event, &disposition)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        fail: bool,
        published: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                published: Mutex::new(Vec::new()),
            }
        }
    }

    impl DeadLetterSink for RecordingSink {
        fn publish(&self, event: &RawEvent, reason: &str) -> Result<(), IngestError> {
            if self.fail {
                return Err(IngestError::kafka("broker unreachable"));
            }
            self.published
                .lock()
                .unwrap()
                .push((event.offset, reason.to_string()));
            Ok(())
        }

        fn topic(&self) -> &str {
            "projects.dlq"
        }
    }

    fn event(offset: i64) -> RawEvent {
        RawEvent::new(EventStream::Project, "projects.events", 0, offset, "{}")
    }

    fn dead_letter() -> Disposition {
        Disposition::DeadLetter {
            reason: "Malformed event: projectId is required".to_string(),
        }
    }

    #[test]
    fn test_processed_commits() {
        let settlement = settle(&event(1), &Disposition::Processed, None).unwrap();
        assert_eq!(settlement, Settlement::Commit);
    }

    #[test]
    fn test_failed_holds_offset() {
        let failed = Disposition::Failed {
            error: "cluster down".to_string(),
        };
        assert_eq!(settle(&event(1), &failed, None).unwrap(), Settlement::Hold);
    }

    #[test]
    fn test_dead_letter_is_published_then_committed() {
        let sink = RecordingSink::new(false);

        let settlement = settle(&event(4), &dead_letter(), Some(&sink)).unwrap();

        assert_eq!(settlement, Settlement::Commit);
        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, 4);
    }

    #[test]
    fn test_dead_letter_without_topic_still_commits() {
        assert_eq!(
            settle(&event(4), &dead_letter(), None).unwrap(),
            Settlement::Commit
        );
    }

    #[test]
    fn test_failed_publish_is_an_error() {
        let sink = RecordingSink::new(true);

        let result = settle(&event(4), &dead_letter(), Some(&sink));

        assert!(matches!(result, Err(IngestError::KafkaError(_))));
    }
}
