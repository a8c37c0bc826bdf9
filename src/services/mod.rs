//! Service layer for the downloader.
//!
//! This module contains the remote-facing logic:
//! - Tranco list retrieval (`TrancoClient`, behind the `ListSource` trait)
//! - Per-day fetching with cache, retry and parsing (`DayFetcher`)

mod fetcher;
mod tranco;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::DayFetcher;
pub use tranco::{ListSource, TrancoClient};
