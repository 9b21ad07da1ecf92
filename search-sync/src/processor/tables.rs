//! Mapping from source tables to tracked entity kinds.

use search_sync_shared::EntityKind;

pub const DEFAULT_EVENTS_TABLE: &str = "events";
pub const DEFAULT_JOBS_TABLE: &str = "jobs";
pub const DEFAULT_ORGANIZATIONS_TABLE: &str = "organization";

/// The three tracked table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedTables {
    pub events: String,
    pub jobs: String,
    pub organizations: String,
}

impl Default for TrackedTables {
    fn default() -> Self {
        Self {
            events: DEFAULT_EVENTS_TABLE.to_string(),
            jobs: DEFAULT_JOBS_TABLE.to_string(),
            organizations: DEFAULT_ORGANIZATIONS_TABLE.to_string(),
        }
    }
}

impl TrackedTables {
    /// The entity kind stored in `table`, or `None` for an untracked table.
    pub fn entity_for(&self, table: &str) -> Option<EntityKind> {
        if table == self.events {
            Some(EntityKind::Event)
        } else if table == self.jobs {
            Some(EntityKind::Job)
        } else if table == self.organizations {
            Some(EntityKind::Organization)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let tables = TrackedTables::default();
        assert_eq!(tables.entity_for("events"), Some(EntityKind::Event));
        assert_eq!(tables.entity_for("jobs"), Some(EntityKind::Job));
        assert_eq!(tables.entity_for("organization"), Some(EntityKind::Organization));
        assert_eq!(tables.entity_for("organizations"), None);
        assert_eq!(tables.entity_for("users"), None);
    }

    #[test]
    fn test_custom_tables() {
        let tables = TrackedTables {
            events: "event".to_string(),
            jobs: "job_posting".to_string(),
            organizations: "org".to_string(),
        };
        assert_eq!(tables.entity_for("job_posting"), Some(EntityKind::Job));
        assert_eq!(tables.entity_for("jobs"), None);
    }
}
