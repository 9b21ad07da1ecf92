//! Rebuilds the search indices from PostgreSQL.
//!
//! Usage: `search-sync-resync [events|jobs|organizations]`. Without an
//! argument every index is rebuilt.

use std::env;

use dotenv::dotenv;
use search_sync::{telemetry, Dependencies, IndexingError};
use search_sync_shared::EntityKind;
use tracing::{error, info};

fn kinds_from_args() -> Result<Vec<EntityKind>, IndexingError> {
    match env::args().nth(1) {
        None => Ok(EntityKind::ALL.to_vec()),
        Some(arg) => EntityKind::parse(&arg)
            .map(|kind| vec![kind])
            .ok_or_else(|| {
                IndexingError::config(format!(
                    "Unknown entity kind '{}', expected events, jobs or organizations",
                    arg
                ))
            }),
    }
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv().ok();

    telemetry::init_tracing("search-sync-resync");

    let kinds = kinds_from_args()?;

    info!(kinds = ?kinds, "Starting resync");

    let resync = Dependencies::resync().await?;

    match resync.run(&kinds).await {
        Ok(summary) => {
            info!(indexed = summary.total_indexed(), "Resync completed");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Resync failed");
            Err(e.into())
        }
    }
}
