//! The three entity kinds mirrored into the search indices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An entity kind tracked by the synchronization service.
///
/// Each kind owns one relational table, one reconstructor and one search index.
/// Adding a kind always requires a new reconstructor, so the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Event,
    Job,
    Organization,
}

impl EntityKind {
    /// All kinds, in the order the resync walks them.
    pub const ALL: [EntityKind; 3] = [EntityKind::Organization, EntityKind::Event, EntityKind::Job];

    /// Singular name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Event => "event",
            EntityKind::Job => "job",
            EntityKind::Organization => "organization",
        }
    }

    /// Parse a kind from its singular or plural name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "event" | "events" => Some(EntityKind::Event),
            "job" | "jobs" => Some(EntityKind::Job),
            "organization" | "organizations" => Some(EntityKind::Organization),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
