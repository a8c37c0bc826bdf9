//! Storage abstractions for snapshot persistence.
//!
//! The snapshot file is the whole contract with the external publish step:
//! `tranco_unique_domains_<YEAR>.txt`, one domain per line, ascending.
//! Compressed copies (`*.txt.gz`, `current.txt.gz`) are produced outside
//! this crate and are only ever read here.

pub mod cache;
pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RunSummary;
use crate::pipeline::Snapshot;

// Re-export for convenience
pub use cache::ListCache;
pub use local::LocalStorage;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Final location of the snapshot
    pub path: PathBuf,
    /// Number of domains (lines) written
    pub domain_count: usize,
    /// Size of the file in bytes
    pub bytes: usize,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Replace the snapshot at `key` with `snapshot`, atomically.
    async fn write_snapshot(&self, key: &Path, snapshot: &Snapshot) -> Result<WriteMetadata>;

    /// Load a snapshot's lines. `.gz` keys are decompressed.
    async fn load_snapshot(&self, key: &Path) -> Result<Option<Vec<String>>>;

    /// Persist a run summary as JSON.
    async fn write_summary(&self, key: &Path, summary: &RunSummary) -> Result<PathBuf>;
}
