//! Bulk rebuild of the search indices from the relational store.
//!
//! Pages through live primary keys in ascending order and pushes every row
//! through the same reconstructors the change stream uses. Stale documents
//! are left alone; re-creating the index under a new version removes them.

use std::collections::BTreeMap;

use search_sync_shared::EntityKind;
use tracing::{info, instrument, warn};

use crate::errors::IngestError;
use crate::loader::SearchLoader;
use crate::processor::Reconstructors;

pub const DEFAULT_PAGE_SIZE: i64 = 500;

/// Per-kind counters of one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindSummary {
    pub indexed: u64,
    /// Ids that disappeared between paging and reconstruction.
    pub vanished: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncSummary {
    pub kinds: BTreeMap<EntityKind, KindSummary>,
}

impl ResyncSummary {
    pub fn total_indexed(&self) -> u64 {
        self.kinds.values().map(|k| k.indexed).sum()
    }
}

pub struct Resync {
    reconstructors: Reconstructors,
    loader: SearchLoader,
    page_size: i64,
}

impl Resync {
    pub fn new(reconstructors: Reconstructors, loader: SearchLoader, page_size: i64) -> Self {
        Self {
            reconstructors,
            loader,
            page_size: page_size.max(1),
        }
    }

    /// Rebuild every kind in `kinds`, in order.
    ///
    /// Stops at the first lookup or write error; a rebuild is safe to rerun.
    pub async fn run(&self, kinds: &[EntityKind]) -> Result<ResyncSummary, IngestError> {
        let mut summary = ResyncSummary::default();
        for &kind in kinds {
            let kind_summary = self.rebuild(kind).await?;
            info!(
                entity = %kind,
                indexed = kind_summary.indexed,
                vanished = kind_summary.vanished,
                "Rebuilt index"
            );
            summary.kinds.insert(kind, kind_summary);
        }
        Ok(summary)
    }

    #[instrument(skip(self), fields(entity = %kind))]
    async fn rebuild(&self, kind: EntityKind) -> Result<KindSummary, IngestError> {
        let reconstructor = self.reconstructors.for_kind(kind);
        let mut summary = KindSummary::default();
        // Keys are compared with `>`, so the first page starts below any id
        let mut cursor = i64::MIN;

        loop {
            let ids = reconstructor.list_live_ids(cursor, self.page_size).await?;
            let Some(&last) = ids.last() else {
                break;
            };

            for id in ids.iter().copied() {
                match reconstructor.reconstruct(None, id).await {
                    Ok(document) => {
                        self.loader.upsert(&document).await?;
                        summary.indexed += 1;
                    }
                    Err(e) if e.is_not_found() => {
                        warn!(id, "Row vanished during rebuild, skipping");
                        summary.vanished += 1;
                    }
                    Err(e) => return Err(e),
                }
            }

            info!(cursor = last, indexed = summary.indexed, "Rebuilt page");

            if (ids.len() as i64) < self.page_size {
                break;
            }
            cursor = last;
        }

        Ok(summary)
    }
}
