//! # Search Sync
//!
//! Keeps the events, jobs and organizations search indices in step with
//! PostgreSQL by consuming Debezium change events from Kafka.
//!
//! ## Architecture
//!
//! 1. **Consumer**: Receives change envelopes from the CDC topics
//! 2. **Processor**: Routes each change to a delete or a reconstructed upsert
//! 3. **Loader**: Writes documents to OpenSearch
//! 4. **Orchestrator**: Coordinates the flow, redelivers and commits offsets
//!
//! [`resync`] rebuilds the indices from the relational store out of band.

pub mod config;
pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod resync;
pub mod telemetry;

pub use config::Dependencies;
pub use errors::IngestError;

use thiserror::Error;

/// Errors that can occur during start-up or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
