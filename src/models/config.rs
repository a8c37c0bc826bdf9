//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `fetch.workers`.
pub const WORKERS_ENV: &str = "TR_DOWNLOAD_WORKERS";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote ranking service settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Concurrency and retry behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Local cache of downloaded daily lists
    #[serde(default)]
    pub cache: CacheConfig,

    /// Snapshot output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults when `path` does not exist.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Worker count for a run: `--workers`, then `TR_DOWNLOAD_WORKERS`, then
    /// `fetch.workers`.
    pub fn effective_workers(&self, flag: Option<usize>) -> Result<usize> {
        let env = std::env::var(WORKERS_ENV).ok();
        resolve_workers(flag, env.as_deref(), self.fetch.workers)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.list_size == 0 {
            return Err(AppError::validation("source.list_size must be > 0"));
        }
        url::Url::parse(&self.source.base_url)?;
        if self.fetch.workers == 0 {
            return Err(AppError::validation("fetch.workers must be > 0"));
        }
        if self.fetch.initial_backoff_ms > self.fetch.max_backoff_ms {
            return Err(AppError::validation(
                "fetch.initial_backoff_ms must not exceed fetch.max_backoff_ms",
            ));
        }
        if self.cache.enabled && self.cache.dir.as_os_str().is_empty() {
            return Err(AppError::validation("cache.dir is empty"));
        }
        Ok(())
    }
}

/// Parse a worker count, clamping to at least one.
pub fn parse_workers(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map(|n| n.max(1))
        .map_err(|e| AppError::config(format!("Invalid worker count '{raw}': {e}")))
}

/// Pick the worker count by precedence. The env value is only parsed when
/// no flag is given.
pub fn resolve_workers(flag: Option<usize>, env: Option<&str>, configured: usize) -> Result<usize> {
    match (flag, env) {
        (Some(n), _) => Ok(n.max(1)),
        (None, Some(raw)) => parse_workers(raw),
        (None, None) => Ok(configured.max(1)),
    }
}

/// Remote ranking service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the Tranco service
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Number of top entries to download per day
    #[serde(default = "defaults::list_size")]
    pub list_size: u32,

    /// Request the subdomain-inclusive list variant
    #[serde(default)]
    pub subdomains: bool,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            list_size: defaults::list_size(),
            subdomains: false,
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Concurrency and retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of days fetched concurrently
    #[serde(default = "defaults::workers")]
    pub workers: usize,

    /// Retries after the first attempt for transient failures
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// First backoff delay in milliseconds
    #[serde(default = "defaults::initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "defaults::max_backoff")]
    pub max_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: defaults::workers(),
            max_retries: defaults::max_retries(),
            initial_backoff_ms: defaults::initial_backoff(),
            max_backoff_ms: defaults::max_backoff(),
        }
    }
}

/// Local cache of downloaded daily lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "defaults::cache_enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::cache_enabled(),
            dir: defaults::cache_dir(),
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the snapshot is written to
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,

    /// Write a JSON run summary next to the snapshot
    #[serde(default)]
    pub write_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            write_summary: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn base_url() -> String {
        "https://tranco-list.eu".into()
    }
    pub fn list_size() -> u32 {
        1_000_000
    }
    pub fn user_agent() -> String {
        concat!("tranco-uniques/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        120
    }
    pub fn workers() -> usize {
        8
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn initial_backoff() -> u64 {
        1_000
    }
    pub fn max_backoff() -> u64 {
        30_000
    }
    pub fn cache_enabled() -> bool {
        true
    }
    pub fn cache_dir() -> PathBuf {
        PathBuf::from(".tranco")
    }
    pub fn output_dir() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
