// src/models/mod.rs

//! Domain models for the downloader.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod day;
mod entry;
mod summary;

// Re-export all public types
pub use config::{
    CacheConfig, Config, FetchConfig, LoggingConfig, OutputConfig, SourceConfig, WORKERS_ENV,
    parse_workers, resolve_workers,
};
pub use day::{DayKey, RunWindow};
pub use entry::{FetchFailure, FetchResult, RankedEntry, parse_list};
pub use summary::RunSummary;
