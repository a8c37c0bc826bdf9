//! Exponential backoff for retrying transient failures.

use std::time::Duration;

use crate::models::FetchConfig;

/// Retry limits shared by every fetch of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A policy that never waits; used in tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(*self)
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_backoff_ms),
            max_delay: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// Per-request backoff state.
#[derive(Debug)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    current_attempt: u32,
}

impl ExponentialBackoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            current_attempt: 0,
        }
    }

    /// Delay before the next retry, or `None` once retries are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.policy.max_retries {
            return None;
        }

        let factor = 2u32.saturating_pow(self.current_attempt);
        let delay = self
            .policy
            .initial_delay
            .saturating_mul(factor)
            .min(self.policy.max_delay);

        self.current_attempt += 1;
        Some(delay)
    }

    /// Retries consumed so far.
    pub fn retries(&self) -> u32 {
        self.current_attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_and_cap() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        };
        let mut backoff = policy.backoff();
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay())
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
    }

    #[test]
    fn test_zero_retries_never_waits() {
        let mut backoff = RetryPolicy::immediate(0).backoff();
        assert!(backoff.next_delay().is_none());
        assert_eq!(backoff.retries(), 0);
    }

    #[test]
    fn test_from_fetch_config() {
        let policy = RetryPolicy::from(&FetchConfig::default());
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
    }
}
