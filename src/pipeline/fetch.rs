// src/pipeline/fetch.rs

//! Bounded parallel fetch of every day in the window.

use futures::stream::{self, StreamExt};

use crate::models::{DayKey, FetchResult};
use crate::services::DayFetcher;

/// Receives a notification each time a day settles.
pub trait FetchProgress: Send + Sync {
    fn day_settled(&self, done: usize, total: usize, result: &FetchResult);
}

/// Progress sink that ignores every notification.
impl FetchProgress for () {
    fn day_settled(&self, _done: usize, _total: usize, _result: &FetchResult) {}
}

/// Fetch every day, at most `workers` at a time.
///
/// Each fetch runs as its own task on the multi-threaded runtime; new tasks
/// are admitted only as earlier ones settle. Returns after all days have
/// settled, with one result per day, ordered by day.
pub async fn fetch_all(
    fetcher: &DayFetcher,
    days: &[DayKey],
    workers: usize,
    progress: &dyn FetchProgress,
) -> Vec<FetchResult> {
    let total = days.len();
    let workers = workers.max(1);

    let mut settled = stream::iter(days.iter().copied())
        .map(|day| {
            let fetcher = fetcher.clone();
            async move {
                match tokio::spawn(async move { fetcher.fetch(day).await }).await {
                    Ok(result) => result,
                    Err(e) => FetchResult::failure(day, format!("fetch task aborted: {e}"), 1),
                }
            }
        })
        .buffer_unordered(workers);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = settled.next().await {
        if let Some(failure) = result.failure_info() {
            log::warn!("[{}] ERROR: {}", failure.day, failure.reason);
        } else {
            log::debug!("[{}] {} entries", result.day, result.entry_count());
        }

        progress.day_settled(results.len() + 1, total, &result);
        results.push(result);
    }

    results.sort_by_key(|r| r.day);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::services::ListSource;
    use crate::services::testing::ScriptedSource;
    use crate::utils::backoff::RetryPolicy;

    fn day(n: u32) -> DayKey {
        DayKey::parse(&format!("2025-02-{n:02}")).unwrap()
    }

    #[derive(Default)]
    struct Counter {
        settled: AtomicUsize,
        last_done: AtomicUsize,
    }

    impl FetchProgress for Counter {
        fn day_settled(&self, done: usize, total: usize, _result: &FetchResult) {
            assert!(done <= total);
            self.settled.fetch_add(1, Ordering::SeqCst);
            self.last_done.store(done, Ordering::SeqCst);
        }
    }

    /// Tracks the peak number of in-flight fetches.
    struct Gauge {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ListSource for Gauge {
        async fn fetch_raw(&self, day: DayKey) -> crate::error::Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("1,{day}.example\n"))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let gauge = Arc::new(Gauge {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let fetcher = DayFetcher::new(gauge.clone(), RetryPolicy::immediate(0));
        let days: Vec<DayKey> = (1..=20).map(day).collect();

        let results = fetch_all(&fetcher, &days, 3, &()).await;

        assert_eq!(results.len(), 20);
        assert!(results.iter().all(FetchResult::is_success));
        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {peak} exceeded bound");
    }

    #[tokio::test]
    async fn test_one_result_per_day_in_day_order() {
        let source = ScriptedSource::new()
            .with_list(day(1), &["apple.com", "zebra.com"])
            .with_list(day(2), &["apple.com", "mango.com"]);
        let fetcher = DayFetcher::new(Arc::new(source), RetryPolicy::immediate(1));
        let days = vec![day(3), day(1), day(2)];
        let counter = Counter::default();

        let results = fetch_all(&fetcher, &days, 8, &counter).await;

        let order: Vec<DayKey> = results.iter().map(|r| r.day).collect();
        assert_eq!(order, vec![day(1), day(2), day(3)]);
        assert!(results[0].is_success());
        assert!(results[1].is_success());
        assert!(!results[2].is_success());
        assert_eq!(counter.settled.load(Ordering::SeqCst), 3);
        assert_eq!(counter.last_done.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_panicking_fetch_becomes_failure() {
        let source = ScriptedSource::new()
            .with_list(day(1), &["ok.com"])
            .panicking(day(2));
        let fetcher = DayFetcher::new(Arc::new(source), RetryPolicy::immediate(0));

        let results = fetch_all(&fetcher, &[day(1), day(2)], 2, &()).await;

        assert!(results[0].is_success());
        let failure = results[1].failure_info().unwrap();
        assert_eq!(failure.day, day(2));
        assert!(failure.reason.contains("aborted"));
    }

    #[tokio::test]
    async fn test_zero_workers_is_clamped() {
        let source = ScriptedSource::new().with_list(day(1), &["a.com"]);
        let fetcher = DayFetcher::new(Arc::new(source), RetryPolicy::immediate(0));

        let results = fetch_all(&fetcher, &[day(1)], 0, &()).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_success());
    }
}
