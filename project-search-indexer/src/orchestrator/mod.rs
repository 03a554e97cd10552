//! Orchestrator module for the project search indexer ingest.
//!
//! Pulls events from a [`Consumer`] one at a time, runs each through the normalizer and
//! the merge engine, and acknowledges it with a [`Disposition`]:
//!
//! - applied: `Processed`, the offset is committed
//! - malformed, unknown kind or rejected by the index: `DeadLetter`, never retried
//! - transient index failure: retried with exponential backoff, then `Failed`
//!
//! A `Failed` event stops the orchestrator so that no later offset on its partition is
//! committed past it; it is redelivered when the indexer restarts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, error, info, instrument, warn};

use project_search_repository::SearchIndexError;

use crate::consumer::{Disposition, RawEvent, StreamMessage};
use crate::errors::IngestError;
use crate::merger::{DocumentMerger, MergeOutcome};
use crate::normalizer;

/// Source of raw events, abstracted so the orchestrator can be driven without Kafka.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Subscribe to the event topics.
    fn subscribe(&self) -> Result<(), IngestError>;

    /// Forward events on `sender` and apply acknowledgments from `ack_receiver` until the
    /// stream ends or `shutdown` fires.
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        ack_receiver: mpsc::UnboundedReceiver<StreamMessage>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError>;
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the event channel buffer. One event is in flight at a time, so this only
    /// bounds read-ahead.
    pub channel_buffer_size: usize,
    /// Retries of a transient index failure before the event is reported as failed.
    pub retry_attempts: usize,
    /// Base delay of the exponential backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Interval between progress log lines.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1,
            retry_attempts: 3,
            retry_base_delay_ms: 10,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Counters since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub events_processed: u64,
    pub documents_written: u64,
    pub documents_deleted: u64,
    pub skipped: u64,
    pub dead_lettered: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    events_processed: AtomicU64,
    documents_written: AtomicU64,
    documents_deleted: AtomicU64,
    skipped: AtomicU64,
    dead_lettered: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> IngestStats {
        IngestStats {
            events_processed: self.events_processed.load(Ordering::Relaxed),
            documents_written: self.documents_written.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            dead_lettered: self.dead_lettered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Orchestrator that coordinates the ingest components.
///
/// The orchestrator:
/// - Manages the lifecycle of the consumer task
/// - Normalizes and merges each event to completion before taking the next
/// - Decides the disposition of every event
/// - Handles shutdown signals and logs progress
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    merger: DocumentMerger,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    counters: Arc<Counters>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: Arc<dyn Consumer>, merger: DocumentMerger) -> Self {
        Self::with_config(consumer, merger, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        merger: DocumentMerger,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            merger,
            config,
            shutdown_tx,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Run the orchestrator.
    ///
    /// Blocks until the consumer stream ends, a shutdown signal is received, or an event
    /// fails transiently after all retries (returned as an error). A consumer that stops
    /// with an error, such as an unpublishable dead letter, also fails the run.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), IngestError> {
        info!("Starting project search indexer orchestrator");

        self.consumer.subscribe()?;

        let (event_tx, mut event_rx) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size.max(1));
        let (ack_tx, ack_rx) = mpsc::unbounded_channel::<StreamMessage>();

        let consumer = Arc::clone(&self.consumer);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let consumer_handle = tokio::spawn(async move {
            let result = consumer.run(event_tx, ack_rx, shutdown_rx).await;
            if let Err(e) = &result {
                error!(error = %e, "Consumer error");
            }
            result
        });

        info!("Ready to process events");

        let mut progress_timer = interval(self.config.progress_interval);
        progress_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut previous = self.counters.snapshot();
        let mut previous_time = Instant::now();

        let mut outcome = Ok(());

        loop {
            tokio::select! {
                msg = event_rx.recv() => {
                    match msg {
                        Some(StreamMessage::Event(event)) => {
                            let disposition = self.handle_event(&event).await;
                            let failed = match &disposition {
                                Disposition::Failed { error } => Some(error.clone()),
                                _ => None,
                            };

                            if ack_tx
                                .send(StreamMessage::Acknowledgment { event, disposition })
                                .is_err()
                            {
                                warn!("Acknowledgment channel closed");
                            }

                            if let Some(error) = failed {
                                error!(error = %error, "Stopping after unrecoverable event failure");
                                let _ = self.shutdown_tx.send(());
                                outcome = Err(IngestError::Index(SearchIndexError::unavailable(
                                    format!("event failed after retries: {}", error),
                                )));
                                break;
                            }
                        }
                        Some(StreamMessage::Error(e)) => {
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                        Some(StreamMessage::Acknowledgment { .. }) => {
                            warn!("Received acknowledgment on event channel (should be on ack channel)");
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
                _ = progress_timer.tick() => {
                    let current = self.counters.snapshot();
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(previous_time).as_secs_f64();
                    let rate = |now: u64, before: u64| {
                        if elapsed_secs > 0.0 {
                            now.saturating_sub(before) as f64 / elapsed_secs
                        } else {
                            0.0
                        }
                    };

                    info!(
                        events_processed = current.events_processed,
                        documents_written = current.documents_written,
                        documents_deleted = current.documents_deleted,
                        skipped = current.skipped,
                        dead_lettered = current.dead_lettered,
                        events_per_sec = format!("{:.2}", rate(current.events_processed, previous.events_processed)),
                        documents_per_sec = format!("{:.2}", rate(current.documents_written, previous.documents_written)),
                        "Processing progress"
                    );

                    previous = current;
                    previous_time = now;
                }
            }
        }

        // Close both channels so the consumer task can observe the end of the run
        drop(event_rx);
        drop(ack_tx);
        match consumer_handle.await {
            Ok(Err(e)) if outcome.is_ok() => outcome = Err(e),
            Ok(_) => {}
            Err(e) => error!(error = %e, "Consumer task panicked"),
        }

        let stats = self.stats();
        info!(
            total_events_processed = stats.events_processed,
            total_documents_written = stats.documents_written,
            total_dead_lettered = stats.dead_lettered,
            "Orchestrator shutdown complete"
        );
        outcome
    }

    /// Normalize and merge one event, returning its disposition.
    ///
    /// Every failure is logged here with the event's position.
    #[instrument(skip(self, event), fields(topic = %event.topic, partition = event.partition, offset = event.offset))]
    pub async fn handle_event(&self, event: &RawEvent) -> Disposition {
        self.counters.events_processed.fetch_add(1, Ordering::Relaxed);

        let update = match normalizer::normalize(event) {
            Ok(update) => update,
            Err(e) => {
                error!(stream = %event.stream, error = %e, "Failed to normalize event");
                self.counters.dead_lettered.fetch_add(1, Ordering::Relaxed);
                return Disposition::DeadLetter {
                    reason: e.to_string(),
                };
            }
        };

        let strategy = ExponentialBackoff::from_millis(self.config.retry_base_delay_ms.max(1))
            .factor(2)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.config.retry_attempts);

        let result = RetryIf::spawn(
            strategy,
            || self.merger.apply(&update),
            |e: &IngestError| {
                let retry = e.is_retryable();
                if retry {
                    warn!(project_id = %update.project_id(), error = %e, "Transient index failure, retrying");
                }
                retry
            },
        )
        .await;

        match result {
            Ok(outcome) => {
                let counter = match outcome {
                    MergeOutcome::Deleted => &self.counters.documents_deleted,
                    MergeOutcome::Skipped => &self.counters.skipped,
                    _ => &self.counters.documents_written,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                debug!(project_id = %update.project_id(), outcome = ?outcome, "Event applied");
                Disposition::Processed
            }
            Err(e) if e.is_permanent() => {
                error!(project_id = %update.project_id(), error = %e, "Event rejected, dead-lettering");
                self.counters.dead_lettered.fetch_add(1, Ordering::Relaxed);
                Disposition::DeadLetter {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                error!(project_id = %update.project_id(), error = %e, "Event failed after retries");
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                Disposition::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Counters since startup.
    pub fn stats(&self) -> IngestStats {
        self.counters.snapshot()
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// A handle that can trigger shutdown while `run` holds the orchestrator.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}
