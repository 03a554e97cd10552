//! Error types for the project search indexer ingest.

use project_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while ingesting an event.
///
/// The variants fall into three classes, which decide what happens to the event:
///
/// - retryable: a transient index failure, safe to apply the same event again
/// - permanent: bad input or a rejected write, dead-lettered without retry
/// - infrastructure: Kafka or channel failures of the ingest itself
#[derive(Error, Debug)]
pub enum IngestError {
    /// The payload cannot be decoded or lacks its identifying fields.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The event discriminator is not one this indexer knows.
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// Error from the index gateway.
    #[error("Index error: {0}")]
    Index(#[from] SearchIndexError),

    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl IngestError {
    /// Create a malformed event error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEvent(msg.into())
    }

    /// Create an unknown event kind error.
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownEventKind(kind.into())
    }

    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }

    /// Returns true if applying the same event again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Index(e) if e.is_retryable())
    }

    /// Returns true if the event can never be applied and belongs on the dead-letter path.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::MalformedEvent(_) | Self::UnknownEventKind(_) => true,
            Self::Index(e) => !e.is_retryable(),
            Self::KafkaError(_) | Self::ChannelError(_) => false,
        }
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let transient = IngestError::from(SearchIndexError::unavailable("timeout"));
        assert!(transient.is_retryable());
        assert!(!transient.is_permanent());

        let rejected = IngestError::from(SearchIndexError::request(400, "mapper_parsing_exception"));
        assert!(!rejected.is_retryable());
        assert!(rejected.is_permanent());

        assert!(IngestError::malformed("no projectId").is_permanent());
        assert!(IngestError::unknown_kind("ARCHIVED").is_permanent());

        let kafka = IngestError::kafka("broker down");
        assert!(!kafka.is_retryable());
        assert!(!kafka.is_permanent());
    }
}
