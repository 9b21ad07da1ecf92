//! OpenSearch index configuration and mappings.
//!
//! This module defines the alias names, versioned index names, settings and
//! mappings for the events, jobs and organizations indices.

use search_sync_shared::EntityKind;
use serde_json::{json, Value};

/// Default alias of the events index.
pub const DEFAULT_EVENTS_ALIAS: &str = "events";

/// Default alias of the jobs index.
pub const DEFAULT_JOBS_ALIAS: &str = "jobs";

/// Default alias of the organizations index.
pub const DEFAULT_ORGANIZATIONS_ALIAS: &str = "organizations";

/// Date layout of the `YYYY-MM-DD` document fields.
const DATE_FORMAT: &str = "yyyy-MM-dd";

/// Date layout of the `YYYY-MM-DD HH:MM:SS` document fields.
const TIMESTAMP_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Configuration for the three search indices.
///
/// All document operations go through the alias; the alias points at a
/// versioned physical index (e.g. `events_v0`) so an index can be rebuilt
/// under a new version and swapped in.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub events_alias: String,
    pub jobs_alias: String,
    pub organizations_alias: String,
    /// The version number of the physical indices (e.g., 0 for "events_v0").
    pub version: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            events_alias: DEFAULT_EVENTS_ALIAS.to_string(),
            jobs_alias: DEFAULT_JOBS_ALIAS.to_string(),
            organizations_alias: DEFAULT_ORGANIZATIONS_ALIAS.to_string(),
            version: 0,
        }
    }
}

impl IndexConfig {
    /// Create a new index configuration.
    pub fn new(
        events_alias: impl Into<String>,
        jobs_alias: impl Into<String>,
        organizations_alias: impl Into<String>,
        version: u32,
    ) -> Self {
        Self {
            events_alias: events_alias.into(),
            jobs_alias: jobs_alias.into(),
            organizations_alias: organizations_alias.into(),
            version,
        }
    }

    /// The alias used for document operations on `kind`.
    pub fn alias(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Event => &self.events_alias,
            EntityKind::Job => &self.jobs_alias,
            EntityKind::Organization => &self.organizations_alias,
        }
    }

    /// The physical index behind the alias of `kind`.
    pub fn versioned_index_name(&self, kind: EntityKind) -> String {
        format!("{}_v{}", self.alias(kind), self.version)
    }
}

fn organization_summary_mapping() -> Value {
    json!({
        "properties": {
            "id": { "type": "long" },
            "name": {
                "type": "text",
                "fields": { "raw": { "type": "keyword" } }
            },
            "picUrl": { "type": "keyword", "index": false }
        }
    })
}

fn category_mapping() -> Value {
    json!({
        "properties": {
            "value": { "type": "long" },
            "label": { "type": "keyword" }
        }
    })
}

fn properties(kind: EntityKind) -> Value {
    match kind {
        EntityKind::Event => json!({
            "id": { "type": "long" },
            "name": {
                "type": "search_as_you_type",
                "fields": { "raw": { "type": "keyword" } }
            },
            "picUrl": { "type": "keyword", "index": false },
            "content": { "type": "text" },
            "latitude": { "type": "double" },
            "longitude": { "type": "double" },
            "startDate": { "type": "date", "format": DATE_FORMAT },
            "endDate": { "type": "date", "format": DATE_FORMAT },
            "startTime": { "type": "keyword" },
            "endTime": { "type": "keyword" },
            "locationName": { "type": "text" },
            "province": { "type": "keyword" },
            "country": { "type": "keyword" },
            "locationType": { "type": "keyword" },
            "organization": organization_summary_mapping(),
            "categories": category_mapping(),
            "audience": { "type": "integer" },
            "price": { "type": "double" },
            "updatedAt": { "type": "date", "format": TIMESTAMP_FORMAT }
        }),
        EntityKind::Job => json!({
            "id": { "type": "long" },
            "title": {
                "type": "search_as_you_type",
                "fields": { "raw": { "type": "keyword" } }
            },
            "picUrl": { "type": "keyword", "index": false },
            "scope": { "type": "text" },
            "description": { "type": "text" },
            "locationName": { "type": "text" },
            "latitude": { "type": "double" },
            "longitude": { "type": "double" },
            "province": { "type": "keyword" },
            "country": { "type": "keyword" },
            "workplaceType": { "type": "keyword" },
            "workType": { "type": "keyword" },
            "period": { "type": "keyword" },
            "dateStart": { "type": "date", "format": DATE_FORMAT },
            "dateEnd": { "type": "date", "format": DATE_FORMAT },
            "hoursPerDay": { "type": "integer" },
            "qualifications": { "type": "text" },
            "benefits": { "type": "text" },
            "organization": organization_summary_mapping(),
            "categories": category_mapping(),
            "prerequisites": {
                "properties": {
                    "title": { "type": "text" },
                    "link": { "type": "keyword", "index": false }
                }
            },
            "updatedAt": { "type": "date", "format": TIMESTAMP_FORMAT }
        }),
        EntityKind::Organization => json!({
            "id": { "type": "long" },
            "name": {
                "type": "search_as_you_type",
                "fields": { "raw": { "type": "keyword" } }
            },
            "picUrl": { "type": "keyword", "index": false },
            "description": { "type": "text" },
            "email": { "type": "keyword" },
            "phone": { "type": "keyword" },
            "latitude": { "type": "double" },
            "longitude": { "type": "double" },
            "province": { "type": "keyword" },
            "country": { "type": "keyword" },
            "updatedAt": { "type": "date", "format": TIMESTAMP_FORMAT }
        }),
    }
}

/// Get the index creation body for `kind`: settings, mappings and the alias.
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
pub fn get_index_body(kind: EntityKind, alias: &str) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic": false,
            "properties": properties(kind)
        },
        "aliases": {
            alias: {}
        }
    })
}
