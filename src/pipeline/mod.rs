//! Pipeline entry points.
//!
//! - `fetch_all`: Bounded parallel download of every day in the window
//! - `aggregate`: Merge fetched lists into a sorted unique snapshot
//! - `run_uniques`: Fetch → aggregate → write, as one run
//! - `diff_snapshots`: Compare a snapshot with the published baseline

pub mod aggregate;
pub mod diff;
pub mod fetch;
pub mod run;

pub use aggregate::{Aggregate, DomainSet, Snapshot, aggregate};
pub use diff::{SnapshotDiff, calculate_diff, diff_snapshots};
pub use fetch::{FetchProgress, fetch_all};
pub use run::{RunOptions, RunState, run_uniques};
