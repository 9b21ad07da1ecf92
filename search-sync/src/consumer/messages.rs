//! Message types for the consumer.
//!
//! Defines the change event model and the messages that flow between the
//! consumer task and the orchestrator.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A row image: column name to column value, as carried by the envelope.
pub type RowImage = Map<String, Value>;

/// The operation a change event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Row inserted (`c`).
    Create,
    /// Row updated (`u`).
    Update,
    /// Row removed (`d`).
    Delete,
    /// Row read during an initial snapshot (`r`).
    SnapshotRead,
}

impl Operation {
    /// Parse the envelope's single-letter operation code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(Self::Create),
            "u" => Some(Self::Update),
            "d" => Some(Self::Delete),
            "r" => Some(Self::SnapshotRead),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Create => "c",
            Self::Update => "u",
            Self::Delete => "d",
            Self::SnapshotRead => "r",
        }
    }
}

/// One row-change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub operation: Operation,
    /// Row image before the change; carries at least the primary key on delete.
    pub before: Option<RowImage>,
    /// Row image after the change; present on create, update and snapshot read.
    pub after: Option<RowImage>,
    pub source_table: String,
    pub timestamp_millis: i64,
}

impl ChangeEvent {
    /// Create an event for `table` with the given operation and images.
    pub fn new(
        operation: Operation,
        source_table: impl Into<String>,
        before: Option<RowImage>,
        after: Option<RowImage>,
    ) -> Self {
        Self {
            operation,
            before,
            after,
            source_table: source_table.into(),
            timestamp_millis: 0,
        }
    }

    /// The commit time recorded by the connector, if representable.
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_millis)
    }
}

/// Position of a Kafka message, used to commit past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOffset {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl MessageOffset {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
        }
    }
}

/// Why a message was handed over without an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Empty value or null payload: the compaction marker that follows a delete.
    Tombstone,
    /// The envelope could not be decoded.
    Undecodable(String),
}

/// Messages that flow through the ingest.
#[derive(Debug)]
pub enum StreamMessage {
    /// One decoded change event.
    Event {
        event: ChangeEvent,
        offset: MessageOffset,
    },
    /// A message that carries no event; its offset still has to be committed
    /// in order with the events around it.
    Skipped {
        reason: SkipReason,
        offset: MessageOffset,
    },
    /// Orchestrator verdict for one offset.
    Acknowledgment {
        offset: MessageOffset,
        commit: bool,
        error: Option<String>,
    },
    /// Stream has ended.
    End,
    /// An error occurred.
    Error(String),
}
