use serde::Serialize;

use crate::db::models::{Verification, ViewOutcome};

/// What the data phase did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportDecision {
    /// Table contents replaced with the cleaned file
    Replaced,
    /// `if-empty` mode found existing rows and left them alone
    SkippedNotEmpty,
    /// `never` mode: views only
    Skipped,
}

/// Row counts of the full-refresh replace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    pub rows_deleted: u64,
    pub rows_inserted: u64,
    pub batches_committed: usize,
}

/// Result of one Loader run
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub import: ImportDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<ReplaceSummary>,
    /// Row count of `jobs` once the data phase finished
    pub table_rows: i64,
    pub views: Vec<ViewOutcome>,
    pub verification: Verification,
}

impl LoadReport {
    pub fn views_failed(&self) -> usize {
        self.views.iter().filter(|v| !v.is_created()).count()
    }
}
