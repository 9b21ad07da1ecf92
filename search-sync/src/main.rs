//! Search sync service entry point.
//!
//! Consumes change events from Kafka and applies them to the search indices
//! until the stream ends, Ctrl+C is pressed or an event cannot be applied.

use dotenv::dotenv;
use search_sync::{telemetry, Dependencies, IndexingError};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv().ok();

    telemetry::init_tracing("search-sync");

    info!("Starting search sync");

    let mut deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run().await {
        Ok(()) => {
            info!("Search sync stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Search sync failed");
            Err(e.into())
        }
    }
}
