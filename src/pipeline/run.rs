// src/pipeline/run.rs

//! End-to-end run: fetch → aggregate → write.
//!
//! A run is a single linear pass with no checkpoints:
//!
//! ```text
//! INIT → FETCHING → AGGREGATING → WRITING → DONE
//!           │                        │
//!           └──────→ FAILED ←────────┘
//! ```
//!
//! FAILED is reached only when every day failed to fetch or when the
//! snapshot write failed. Nothing is written before aggregation completes.

use std::fmt;
use std::path::PathBuf;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{FetchFailure, RunSummary, RunWindow};
use crate::pipeline::{FetchProgress, aggregate, fetch_all};
use crate::services::DayFetcher;
use crate::storage::SnapshotStorage;
use crate::utils::log as banner;

/// Phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Fetching,
    Aggregating,
    Writing,
    Done,
    Failed,
}

impl RunState {
    /// Whether `next` directly follows `self`.
    pub fn can_transition_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Init, RunState::Fetching)
                | (RunState::Fetching, RunState::Aggregating)
                | (RunState::Fetching, RunState::Failed)
                | (RunState::Aggregating, RunState::Writing)
                | (RunState::Writing, RunState::Done)
                | (RunState::Writing, RunState::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "INIT",
            RunState::Fetching => "FETCHING",
            RunState::Aggregating => "AGGREGATING",
            RunState::Writing => "WRITING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct Tracker {
    state: RunState,
}

impl Tracker {
    fn new() -> Self {
        Self {
            state: RunState::Init,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} → {}",
            self.state,
            next
        );
        log::debug!("Run state: {} → {}", self.state, next);
        self.state = next;
    }
}

/// Where a run writes its output and how wide it fans out.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum concurrent day fetches
    pub workers: usize,
    /// Snapshot location, relative to the storage root
    pub snapshot_key: PathBuf,
    /// Optional JSON summary location, relative to the storage root
    pub summary_key: Option<PathBuf>,
}

impl RunOptions {
    /// Defaults for a window: snapshot named after the window's year(s).
    pub fn for_window(window: &RunWindow, workers: usize) -> Self {
        Self {
            workers,
            snapshot_key: PathBuf::from(window.snapshot_file_name()),
            summary_key: None,
        }
    }

    /// Put the summary next to the snapshot as `<stem>.summary.json`.
    pub fn with_summary_beside_snapshot(mut self) -> Self {
        let stem = self
            .snapshot_key
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.summary_key = Some(self.snapshot_key.with_file_name(format!("{stem}.summary.json")));
        self
    }
}

/// Run the whole pipeline for `window`.
pub async fn run_uniques(
    window: &RunWindow,
    fetcher: &DayFetcher,
    storage: &dyn SnapshotStorage,
    options: &RunOptions,
    progress: &dyn FetchProgress,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let mut tracker = Tracker::new();

    let days = window.days();
    let total = days.len();
    banner::header(&format!(
        "Tranco unique domains {} → {} ({} days, {} workers)",
        window.start,
        window.end,
        total,
        options.workers.max(1)
    ));

    // Fetch
    tracker.advance(RunState::Fetching);
    banner::step(1, 3, "Fetch - Downloading daily lists");
    let results = fetch_all(fetcher, &days, options.workers, progress).await;

    let failed_days: Vec<FetchFailure> = results
        .iter()
        .filter_map(|r| r.failure_info().cloned())
        .collect();

    if failed_days.len() == total {
        tracker.advance(RunState::Failed);
        log::error!("All {} fetches failed; no snapshot written", total);
        return Err(AppError::AllFetchesFailed { total });
    }

    if !failed_days.is_empty() {
        log::warn!(
            "{} of {} days failed and were skipped:",
            failed_days.len(),
            total
        );
        for failure in &failed_days {
            log::warn!("    {}: {}", failure.day, failure.reason);
        }
    }

    // Aggregate
    tracker.advance(RunState::Aggregating);
    banner::step(2, 3, "Aggregate - Merging unique domains");
    let merged = aggregate(results);
    log::info!(
        "{} entries merged into {} unique domains",
        banner::thousands(merged.entries_seen),
        banner::thousands(merged.snapshot.len())
    );

    // Write
    tracker.advance(RunState::Writing);
    banner::step(3, 3, "Write - Saving snapshot");
    let written = match storage
        .write_snapshot(&options.snapshot_key, &merged.snapshot)
        .await
    {
        Ok(meta) => meta,
        Err(e) => {
            tracker.advance(RunState::Failed);
            log::error!(
                "Failed to write snapshot {}: {}",
                options.snapshot_key.display(),
                e
            );
            return Err(e);
        }
    };

    let summary = RunSummary {
        start: window.start,
        end: window.end,
        started_at,
        finished_at: Utc::now(),
        days_total: total,
        days_failed: failed_days.len(),
        failed_days,
        entries_seen: merged.entries_seen,
        domain_count: written.domain_count,
        snapshot_path: written.path,
        snapshot_bytes: written.bytes,
        sha256: written.sha256,
    };

    if let Some(key) = &options.summary_key {
        match storage.write_summary(key, &summary).await {
            Ok(path) => log::info!("Run summary saved to {}", path.display()),
            Err(e) => log::warn!("Could not write run summary {}: {}", key.display(), e),
        }
    }

    tracker.advance(RunState::Done);
    banner::summary(
        "Run complete",
        &[
            (
                "Days fetched",
                format!("{}/{}", summary.days_succeeded(), summary.days_total),
            ),
            ("Total unique domains", banner::thousands(summary.domain_count)),
            ("Saved to", summary.snapshot_path.display().to_string()),
            ("SHA-256", summary.sha256.clone()),
            ("Elapsed", format!("{}s", summary.elapsed_secs())),
        ],
    );

    Ok(summary)
}
