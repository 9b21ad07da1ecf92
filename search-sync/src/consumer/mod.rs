//! Consumer module for the search sync ingest.
//!
//! Provides the change event model, the Debezium envelope decoder and the
//! Kafka consumer that feeds the orchestrator.

pub mod envelope;
mod kafka_consumer;
mod messages;

pub use kafka_consumer::KafkaConsumer;
pub use messages::{ChangeEvent, MessageOffset, Operation, RowImage, SkipReason, StreamMessage};
