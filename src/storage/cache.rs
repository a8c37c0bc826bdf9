//! On-disk cache of raw daily lists.
//!
//! Published daily lists never change, so a payload that parsed once can be
//! reused on every later run. Entries live at `{dir}/{YYYY-MM-DD}.csv`.

use std::path::PathBuf;

use crate::error::Result;
use crate::models::DayKey;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct ListCache {
    storage: LocalStorage,
}

impl ListCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: LocalStorage::new(dir),
        }
    }

    fn key(day: DayKey) -> String {
        format!("{day}.csv")
    }

    /// Cached payload for `day`, if present and valid UTF-8.
    pub async fn load(&self, day: DayKey) -> Result<Option<String>> {
        let Some(bytes) = self.storage.read_bytes(Self::key(day)).await? else {
            return Ok(None);
        };

        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(_) => {
                log::warn!("Ignoring non-UTF-8 cache entry for {}", day);
                Ok(None)
            }
        }
    }

    pub async fn store(&self, day: DayKey, payload: &str) -> Result<()> {
        self.storage
            .write_bytes(Self::key(day), payload.as_bytes())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_then_load() {
        let tmp = TempDir::new().unwrap();
        let cache = ListCache::new(tmp.path().join(".tranco"));
        let day = DayKey::parse("2025-05-05").unwrap();

        assert!(cache.load(day).await.unwrap().is_none());

        cache.store(day, "1,a.com\n2,b.com\n").await.unwrap();
        assert_eq!(
            cache.load(day).await.unwrap().as_deref(),
            Some("1,a.com\n2,b.com\n")
        );
        assert!(tmp.path().join(".tranco/2025-05-05.csv").exists());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = ListCache::new(tmp.path());
        let day = DayKey::parse("2025-05-06").unwrap();

        std::fs::write(tmp.path().join("2025-05-06.csv"), [0xff, 0xfe, 0x00]).unwrap();
        assert!(cache.load(day).await.unwrap().is_none());
    }
}
