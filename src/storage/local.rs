//! Local filesystem storage implementation.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── tranco_unique_domains_2025.txt          # Snapshot (written by `run`)
//! ├── tranco_unique_domains_2025.summary.json # Optional run summary
//! ├── tranco_unique_domains_2025.txt.gz       # Published archive (external)
//! └── current.txt.gz                          # Diff baseline (external)
//! ```
//!
//! Every write goes to a sibling `*.tmp` file first and is renamed over the
//! target, so a crash never leaves a truncated snapshot behind.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::read::GzDecoder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::RunSummary;
use crate::pipeline::Snapshot;
use crate::storage::{SnapshotStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key. Absolute keys are used as-is.
    pub fn path(&self, key: impl AsRef<Path>) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: impl AsRef<Path>, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = Self::tmp_path(&path);
        if let Err(e) = Self::write_tmp(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Io(e));
        }
        Ok(path)
    }

    async fn write_tmp(tmp: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Write JSON data.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: impl AsRef<Path>,
        value: &T,
    ) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    pub async fn read_bytes(&self, key: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// Decode snapshot bytes into lines, gunzipping first when `gzipped`.
fn decode_lines(bytes: Vec<u8>, gzipped: bool) -> Result<Vec<String>> {
    let text = if gzipped {
        let mut text = String::new();
        GzDecoder::new(bytes.as_slice()).read_to_string(&mut text)?;
        text
    } else {
        String::from_utf8(bytes).map_err(|e| {
            AppError::validation(format!("Snapshot is not valid UTF-8: {e}"))
        })?
    };

    Ok(text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

#[async_trait]
impl SnapshotStorage for LocalStorage {
    async fn write_snapshot(&self, key: &Path, snapshot: &Snapshot) -> Result<WriteMetadata> {
        let bytes = snapshot.to_bytes();
        let sha256 = hex::encode(Sha256::digest(&bytes));

        let path = self.write_bytes(key, &bytes).await?;
        log::info!(
            "Snapshot: {} domains ({} bytes) written to {}",
            snapshot.len(),
            bytes.len(),
            path.display()
        );

        Ok(WriteMetadata {
            path,
            domain_count: snapshot.len(),
            bytes: bytes.len(),
            sha256,
        })
    }

    async fn load_snapshot(&self, key: &Path) -> Result<Option<Vec<String>>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(decode_lines(bytes, is_gzip(key))?)),
            None => {
                log::warn!("No snapshot found at {}", self.path(key).display());
                Ok(None)
            }
        }
    }

    async fn write_summary(&self, key: &Path, summary: &RunSummary) -> Result<PathBuf> {
        self.write_json(key, summary).await
    }
}
