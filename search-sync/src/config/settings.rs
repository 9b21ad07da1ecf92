//! Environment-driven settings.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::orchestrator::OrchestratorConfig;
use crate::processor::{
    SoftDeleteDetector, TrackedTables, DEFAULT_EVENTS_TABLE, DEFAULT_JOBS_TABLE,
    DEFAULT_ORGANIZATIONS_TABLE, DEFAULT_SOFT_DELETE_COLUMN,
};
use crate::resync::DEFAULT_PAGE_SIZE;
use crate::IndexingError;
use search_sync_repository::opensearch::{
    IndexConfig, DEFAULT_EVENTS_ALIAS, DEFAULT_JOBS_ALIAS, DEFAULT_ORGANIZATIONS_ALIAS,
};
use search_sync_repository::postgres::is_valid_column_name;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default Kafka broker address.
const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "search-sync";

/// Default CDC topics, one per tracked table.
const DEFAULT_KAFKA_TOPICS: &str = "cdc.public.events,cdc.public.jobs,cdc.public.organization";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MAX_DELIVERY_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Anything else falls back to "retry".
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            other => {
                warn!(value = %other, "Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT=json` selects JSON; anything else is pretty console output.
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Everything the binaries read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub opensearch_url: String,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub index_config: IndexConfig,
    pub kafka_broker: String,
    pub kafka_group_id: String,
    pub kafka_topics: Vec<String>,
    pub tables: TrackedTables,
    pub soft_delete_columns: Vec<String>,
    pub max_delivery_attempts: u32,
    pub retry_backoff: Duration,
    pub resync_page_size: i64,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL DSN (required)
    /// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: retry interval in seconds (default: 15)
    /// - `INDEX_VERSION`: physical index version (default: 0)
    /// - `EVENTS_INDEX` / `JOBS_INDEX` / `ORGANIZATIONS_INDEX`: index aliases
    /// - `KAFKA_BROKER`: Kafka broker address (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: consumer group ID (default: search-sync)
    /// - `KAFKA_TOPICS`: comma-separated CDC topics
    /// - `EVENTS_TABLE` / `JOBS_TABLE` / `ORGANIZATIONS_TABLE`: tracked tables
    /// - `SOFT_DELETE_COLUMNS`: comma-separated marker columns (default: deleted_at)
    /// - `MAX_DELIVERY_ATTEMPTS`: deliveries per event (default: 5)
    /// - `RETRY_BACKOFF_MS`: first redelivery backoff (default: 200)
    /// - `RESYNC_PAGE_SIZE`: ids per page of a bulk rebuild (default: 500)
    pub fn from_env() -> Result<Self, IndexingError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| IndexingError::config("DATABASE_URL must be set"))?;

        let index_config = IndexConfig::new(
            var_or("EVENTS_INDEX", DEFAULT_EVENTS_ALIAS),
            var_or("JOBS_INDEX", DEFAULT_JOBS_ALIAS),
            var_or("ORGANIZATIONS_INDEX", DEFAULT_ORGANIZATIONS_ALIAS),
            parse_or("INDEX_VERSION", 0)?,
        );

        let tables = TrackedTables {
            events: var_or("EVENTS_TABLE", DEFAULT_EVENTS_TABLE),
            jobs: var_or("JOBS_TABLE", DEFAULT_JOBS_TABLE),
            organizations: var_or("ORGANIZATIONS_TABLE", DEFAULT_ORGANIZATIONS_TABLE),
        };

        let kafka_topics = split_list(&var_or("KAFKA_TOPICS", DEFAULT_KAFKA_TOPICS));
        if kafka_topics.is_empty() {
            return Err(IndexingError::config("KAFKA_TOPICS must name at least one topic"));
        }

        let soft_delete_columns =
            split_list(&var_or("SOFT_DELETE_COLUMNS", DEFAULT_SOFT_DELETE_COLUMN));
        // The same columns filter the relational lookups, so they must be SQL identifiers
        if let Some(column) = soft_delete_columns
            .iter()
            .find(|column| !is_valid_column_name(column))
        {
            return Err(IndexingError::config(format!(
                "SOFT_DELETE_COLUMNS contains an invalid column name: {}",
                column
            )));
        }

        let max_delivery_attempts = parse_or("MAX_DELIVERY_ATTEMPTS", DEFAULT_MAX_DELIVERY_ATTEMPTS)?;
        if max_delivery_attempts == 0 {
            return Err(IndexingError::config("MAX_DELIVERY_ATTEMPTS must be at least 1"));
        }

        let resync_page_size = parse_or("RESYNC_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if resync_page_size < 1 {
            return Err(IndexingError::config("RESYNC_PAGE_SIZE must be at least 1"));
        }

        Ok(Self {
            database_url,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
            opensearch_url: var_or("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            connection_mode: ConnectionMode::parse(&var_or("OPENSEARCH_CONNECTION_MODE", "retry")),
            retry_interval: Duration::from_secs(parse_or(
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )?),
            index_config,
            kafka_broker: var_or("KAFKA_BROKER", DEFAULT_KAFKA_BROKER),
            kafka_group_id: var_or("KAFKA_GROUP_ID", DEFAULT_KAFKA_GROUP_ID),
            kafka_topics,
            tables,
            soft_delete_columns,
            max_delivery_attempts,
            retry_backoff: Duration::from_millis(parse_or(
                "RETRY_BACKOFF_MS",
                DEFAULT_RETRY_BACKOFF_MS,
            )?),
            resync_page_size,
        })
    }

    pub fn soft_delete_detector(&self) -> SoftDeleteDetector {
        SoftDeleteDetector::new(self.soft_delete_columns.clone())
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_delivery_attempts: self.max_delivery_attempts,
            retry_backoff: self.retry_backoff,
            ..OrchestratorConfig::default()
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T, IndexingError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| IndexingError::config(format!("{} has an invalid value: {}", name, value))),
        _ => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
