//! Snapshot diff for the publish step.
//!
//! Compares a freshly written snapshot with the last published one
//! (`current.txt.gz`) and produces the counts used in the commit message.
//! Nothing here writes, compresses or commits.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::DayKey;
use crate::storage::SnapshotStorage;

/// Line-level difference between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SnapshotDiff {
    /// Domains in the new snapshot but not in the baseline
    pub added: usize,
    /// Domains in the baseline but not in the new snapshot
    pub removed: usize,
    /// Domains in the new snapshot
    pub total: usize,
}

impl SnapshotDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.removed > 0
    }

    /// `chore: update uniques <YYYY-MM-DD> (+<ADDED>, total <TOTAL>)`
    pub fn commit_message(&self, day: DayKey) -> String {
        format!(
            "chore: update uniques {} (+{}, total {})",
            day, self.added, self.total
        )
    }
}

/// Calculate the diff between a baseline and a current snapshot.
pub fn calculate_diff(baseline: &[String], current: &[String]) -> SnapshotDiff {
    let prev: HashSet<&str> = baseline.iter().map(String::as_str).collect();
    let curr: HashSet<&str> = current.iter().map(String::as_str).collect();

    SnapshotDiff {
        added: curr.difference(&prev).count(),
        removed: prev.difference(&curr).count(),
        total: curr.len(),
    }
}

/// Load both snapshots from storage and diff them.
///
/// A missing baseline counts as empty (first publish); a missing current
/// snapshot is an error.
pub async fn diff_snapshots(
    storage: &dyn SnapshotStorage,
    baseline: &Path,
    current: &Path,
) -> Result<SnapshotDiff> {
    let previous = storage.load_snapshot(baseline).await?.unwrap_or_default();
    let latest = storage.load_snapshot(current).await?.ok_or_else(|| {
        AppError::config(format!("Snapshot not found at {}", current.display()))
    })?;

    Ok(calculate_diff(&previous, &latest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_changes() {
        let prev = lines(&["a.com", "b.com"]);
        let result = calculate_diff(&prev, &prev.clone());
        assert!(!result.has_changes());
        assert_eq!(result.total, 2);
    }

    #[test]
    fn test_additions_and_removals() {
        let prev = lines(&["a.com", "b.com", "c.com"]);
        let curr = lines(&["a.com", "c.com", "d.com", "e.com"]);

        let result = calculate_diff(&prev, &curr);
        assert_eq!(
            result,
            SnapshotDiff {
                added: 2,
                removed: 1,
                total: 4
            }
        );
        assert!(result.has_changes());
    }

    #[test]
    fn test_empty_baseline() {
        let result = calculate_diff(&[], &lines(&["first.com"]));
        assert_eq!(result.added, 1);
        assert_eq!(result.removed, 0);
    }

    #[test]
    fn test_commit_message() {
        let diff = SnapshotDiff {
            added: 1234,
            removed: 0,
            total: 5_000_000,
        };
        let day = DayKey::parse("2025-07-04").unwrap();
        assert_eq!(
            diff.commit_message(day),
            "chore: update uniques 2025-07-04 (+1234, total 5000000)"
        );
    }

    #[tokio::test]
    async fn test_diff_snapshots_missing_baseline() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        std::fs::write(tmp.path().join("new.txt"), "a.com\nb.com\n").unwrap();

        let diff = diff_snapshots(&storage, Path::new("current.txt.gz"), Path::new("new.txt"))
            .await
            .unwrap();
        assert_eq!(diff.added, 2);
        assert_eq!(diff.total, 2);
    }

    #[tokio::test]
    async fn test_diff_snapshots_missing_current_is_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let result =
            diff_snapshots(&storage, Path::new("current.txt.gz"), Path::new("new.txt")).await;
        assert!(result.is_err());
    }
}
