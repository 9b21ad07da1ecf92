//! Error types for the search sync ingest.

use search_sync_repository::{LookupError, SearchIndexError};
use search_sync_shared::EntityKind;
use thiserror::Error;

/// Errors that can occur while consuming and applying change events.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The envelope is malformed or a field has the wrong type.
    ///
    /// Redelivering the same bytes can never succeed.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The row named by a create/update event has no live relational record.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    /// The relational lookup failed for a reason other than not-found.
    #[error("Lookup error: {0}")]
    LookupError(LookupError),

    /// The index rejected an upsert or delete.
    #[error("Write error: {0}")]
    WriteError(#[from] SearchIndexError),

    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl IngestError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::DecodeError(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<LookupError> for IngestError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::LookupError(other),
        }
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}
