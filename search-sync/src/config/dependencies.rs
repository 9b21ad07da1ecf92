//! Dependency initialization and wiring for the search sync binaries.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::settings::{ConnectionMode, Settings};
use crate::consumer::KafkaConsumer;
use crate::loader::SearchLoader;
use crate::orchestrator::Orchestrator;
use crate::processor::{Dispatcher, Reconstructors};
use crate::resync::Resync;
use crate::IndexingError;
use search_sync_repository::opensearch::IndexConfig;
use search_sync_repository::{OpenSearchProvider, PostgresRepository};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

/// Collaborators shared by the streaming service and the bulk rebuild.
struct Backends {
    reconstructors: Reconstructors,
    loader: SearchLoader,
}

impl Dependencies {
    /// Initialize all dependencies for the change stream service.
    ///
    /// See [`Settings::from_env`] for the environment variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails (OpenSearch only in fail-fast mode)
    pub async fn new() -> Result<Self, IndexingError> {
        let settings = Settings::from_env()?;

        info!(
            opensearch_url = %settings.opensearch_url,
            kafka_broker = %settings.kafka_broker,
            kafka_group_id = %settings.kafka_group_id,
            kafka_topics = ?settings.kafka_topics,
            connection_mode = ?settings.connection_mode,
            index_version = settings.index_config.version,
            "Initializing dependencies"
        );

        let backends = Self::connect_backends(&settings).await?;

        let consumer = KafkaConsumer::new(
            &settings.kafka_broker,
            &settings.kafka_group_id,
            settings.kafka_topics.clone(),
        )
        .map_err(|e| IndexingError::config(format!("Failed to create Kafka consumer: {}", e)))?;

        info!("Kafka consumer created");

        let dispatcher = Dispatcher::new(
            settings.tables.clone(),
            settings.soft_delete_detector(),
            backends.reconstructors,
            backends.loader,
        );

        let orchestrator = Orchestrator::with_config(
            Arc::new(consumer),
            dispatcher,
            settings.orchestrator_config(),
        );

        Ok(Self { orchestrator })
    }

    /// Initialize the collaborators of a bulk rebuild.
    pub async fn resync() -> Result<Resync, IndexingError> {
        let settings = Settings::from_env()?;

        info!(
            opensearch_url = %settings.opensearch_url,
            page_size = settings.resync_page_size,
            index_version = settings.index_config.version,
            "Initializing resync dependencies"
        );

        let backends = Self::connect_backends(&settings).await?;
        Ok(Resync::new(
            backends.reconstructors,
            backends.loader,
            settings.resync_page_size,
        ))
    }

    /// Connect to PostgreSQL and OpenSearch and make sure the indices exist.
    async fn connect_backends(settings: &Settings) -> Result<Backends, IndexingError> {
        // Lookups hide soft-deleted rows by the same columns the dispatcher checks
        let repository = PostgresRepository::connect(
            &settings.database_url,
            settings.database_max_connections,
            settings.soft_delete_columns.clone(),
        )
        .await
        .map_err(|e| IndexingError::config(format!("Failed to connect to PostgreSQL: {}", e)))?;
        let repository = Arc::new(repository);

        let search_provider = Self::connect_to_opensearch(
            &settings.opensearch_url,
            settings.index_config.clone(),
            settings.connection_mode,
            settings.retry_interval,
        )
        .await?;

        info!("OpenSearch connection established");

        let loader = SearchLoader::new(Arc::new(search_provider));

        // Exits if an index or alias cannot be created
        loader
            .ensure_indices()
            .await
            .map_err(|e| IndexingError::config(format!("Failed to ensure indices exist: {}", e)))?;

        let reconstructors =
            Reconstructors::new(repository.clone(), repository.clone(), repository);

        Ok(Backends {
            reconstructors,
            loader,
        })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, IndexingError> {
        loop {
            match OpenSearchProvider::new(url, index_config.clone()).await {
                Ok(provider) => return Ok(provider),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(IndexingError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}
