//! Soft-delete detection.

use crate::consumer::RowImage;

/// Default logical-deletion marker column.
pub const DEFAULT_SOFT_DELETE_COLUMN: &str = "deleted_at";

/// Recognizes rows that are logically deleted through a marker column.
///
/// A single detector is shared by all entity branches so the marker columns
/// cannot drift between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDeleteDetector {
    columns: Vec<String>,
}

impl Default for SoftDeleteDetector {
    fn default() -> Self {
        Self::new(vec![DEFAULT_SOFT_DELETE_COLUMN.to_string()])
    }
}

impl SoftDeleteDetector {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// True iff some marker column is present in `after` with a non-null value.
    pub fn is_soft_deleted(&self, after: &RowImage) -> bool {
        self.columns
            .iter()
            .any(|column| after.get(column).is_some_and(|value| !value.is_null()))
    }
}
