//! Message types for the consumer.
//!
//! Defines the raw events, wire payloads and acknowledgments that flow between the
//! Kafka consumer and the orchestrator.

use std::fmt;

use serde::Deserialize;
use uuid::Uuid;

/// The logical stream an event was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStream {
    /// Project lifecycle events (created, updated, deleted).
    Project,
    /// Categorization events (main category and tags).
    Categorization,
}

impl EventStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStream::Project => "project",
            EventStream::Categorization => "categorization",
        }
    }
}

impl fmt::Display for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undecoded event as read from Kafka, with its position for acknowledgment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub stream: EventStream,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: Vec<u8>,
}

impl RawEvent {
    pub fn new(
        stream: EventStream,
        topic: impl Into<String>,
        partition: i32,
        offset: i64,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            stream,
            topic: topic.into(),
            partition,
            offset,
            payload: payload.into(),
        }
    }
}

/// Project lifecycle message as published by the project service.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEventMessage {
    pub event_type: Option<String>,
    pub project_id: Option<String>,
    pub employer_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub currency: Option<String>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    /// Producers send `null` for a project created without skills.
    pub required_skills: Option<Vec<String>>,
    pub job_level: Option<String>,
    /// Producer timestamps are kept opaque; the index tracks its own write time.
    pub created_at: Option<serde_json::Value>,
    pub updated_at: Option<serde_json::Value>,
}

/// Categorization message as published by the categorization service.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CategorizationEventMessage {
    pub project_id: Option<String>,
    pub main_category: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Event type of the project event that was categorized.
    pub original_event_type: Option<String>,
}

/// What became of an event once the orchestrator finished with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Applied to the index; the offset can be committed.
    Processed,
    /// Can never be applied; route to the dead-letter topic, then commit.
    DeadLetter { reason: String },
    /// Failed transiently after all retries; do not commit so the event is redelivered.
    Failed { error: String },
}

/// Messages that flow through the ingest.
#[derive(Debug)]
pub enum StreamMessage {
    /// One event read from Kafka.
    Event(RawEvent),
    /// The outcome for a previously delivered event.
    Acknowledgment {
        event: RawEvent,
        disposition: Disposition,
    },
    /// Stream has ended.
    End,
    /// An error occurred.
    Error(String),
}
