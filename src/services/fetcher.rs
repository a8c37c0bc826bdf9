// src/services/fetcher.rs

//! Single-day fetcher.
//!
//! Wraps a [`ListSource`] with the local cache, bounded retry and payload
//! parsing. Errors never escape: every call ends in a [`FetchResult`].

use std::sync::Arc;

use crate::error::Result;
use crate::models::{DayKey, FetchResult, RankedEntry, parse_list};
use crate::services::ListSource;
use crate::storage::ListCache;
use crate::utils::backoff::RetryPolicy;

/// Fetches and parses one day's ranked list.
#[derive(Clone)]
pub struct DayFetcher {
    source: Arc<dyn ListSource>,
    cache: Option<ListCache>,
    retry: RetryPolicy,
}

impl DayFetcher {
    pub fn new(source: Arc<dyn ListSource>, retry: RetryPolicy) -> Self {
        Self {
            source,
            cache: None,
            retry,
        }
    }

    /// Serve and persist payloads through `cache`.
    pub fn with_cache(mut self, cache: ListCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fetch `day`, retrying transient failures.
    pub async fn fetch(&self, day: DayKey) -> FetchResult {
        if let Some(entries) = self.load_cached(day).await {
            log::debug!("{}: served {} entries from cache", day, entries.len());
            return FetchResult::success(day, entries);
        }

        let mut backoff = self.retry.backoff();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let error = match self.fetch_remote(day).await {
                Ok((entries, payload)) => {
                    self.store_cached(day, &payload).await;
                    return FetchResult::success(day, entries);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                return FetchResult::failure(day, error.to_string(), attempts);
            }

            match backoff.next_delay() {
                Some(delay) => {
                    log::warn!(
                        "{}: {} (retry {}/{} in {}ms)",
                        day,
                        error,
                        backoff.retries(),
                        self.retry.max_retries,
                        delay.as_millis()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                None => {
                    return FetchResult::failure(
                        day,
                        format!("{error} (gave up after {attempts} attempts)"),
                        attempts,
                    );
                }
            }
        }
    }

    async fn fetch_remote(&self, day: DayKey) -> Result<(Vec<RankedEntry>, String)> {
        let payload = self.source.fetch_raw(day).await?;
        let entries = parse_list(&payload)?;
        Ok((entries, payload))
    }

    async fn load_cached(&self, day: DayKey) -> Option<Vec<RankedEntry>> {
        let cache = self.cache.as_ref()?;
        let payload = match cache.load(day).await {
            Ok(payload) => payload?,
            Err(e) => {
                log::warn!("{}: cache read failed: {}", day, e);
                return None;
            }
        };

        match parse_list(&payload) {
            Ok(entries) => Some(entries),
            Err(e) => {
                log::warn!("{}: discarding malformed cache entry: {}", day, e);
                None
            }
        }
    }

    async fn store_cached(&self, day: DayKey, payload: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(day, payload).await {
                log::warn!("{}: cache write failed: {}", day, e);
            }
        }
    }
}
