//! Run reporting.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{DayKey, FetchFailure};

/// Report of one completed run, serialized as the optional summary file.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub start: DayKey,
    pub end: DayKey,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub days_total: usize,
    pub days_failed: usize,
    pub failed_days: Vec<FetchFailure>,
    pub entries_seen: usize,
    pub domain_count: usize,
    pub snapshot_path: PathBuf,
    pub snapshot_bytes: usize,
    pub sha256: String,
}

impl RunSummary {
    pub fn days_succeeded(&self) -> usize {
        self.days_total - self.days_failed
    }

    pub fn elapsed_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}
