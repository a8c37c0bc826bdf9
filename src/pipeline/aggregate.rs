// src/pipeline/aggregate.rs

//! Unique-domain aggregation.
//!
//! Ranks are dropped, domains are compared byte-for-byte (no case folding)
//! and the final order is ascending byte order, so the output depends only
//! on the set of domains and never on fetch completion order.

use std::collections::HashSet;

use crate::models::{FetchResult, RankedEntry};

/// Accumulating set of unique domains for one run.
#[derive(Debug, Default)]
pub struct DomainSet {
    domains: HashSet<String>,
    entries_seen: usize,
}

impl DomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one day's entries, consuming them.
    pub fn extend(&mut self, entries: Vec<RankedEntry>) {
        self.entries_seen += entries.len();
        self.domains.reserve(entries.len() / 4);
        self.domains
            .extend(entries.into_iter().map(|e| String::from(e.domain)));
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Total entries merged, duplicates included.
    pub fn entries_seen(&self) -> usize {
        self.entries_seen
    }

    /// Sort into the final snapshot order.
    pub fn into_snapshot(self) -> Snapshot {
        let mut domains: Vec<String> = self.domains.into_iter().collect();
        domains.sort_unstable();
        Snapshot { domains }
    }
}

/// Sorted, deduplicated domain list ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    domains: Vec<String>,
}

impl Snapshot {
    /// Wrap an already sorted, duplicate-free list.
    pub fn from_sorted(domains: Vec<String>) -> Self {
        debug_assert!(domains.windows(2).all(|w| w[0] < w[1]));
        Self { domains }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Serialized form: one domain per line, every line `\n`-terminated.
    pub fn to_bytes(&self) -> Vec<u8> {
        let size: usize = self.domains.iter().map(|d| d.len() + 1).sum();
        let mut out = Vec::with_capacity(size);
        for domain in &self.domains {
            out.extend_from_slice(domain.as_bytes());
            out.push(b'\n');
        }
        out
    }
}

/// Result of aggregating a run's fetch results.
#[derive(Debug)]
pub struct Aggregate {
    pub snapshot: Snapshot,
    pub entries_seen: usize,
}

/// Merge every successful result. Failed days contribute nothing.
pub fn aggregate(results: Vec<FetchResult>) -> Aggregate {
    let mut set = DomainSet::new();
    for result in results {
        if let Ok(entries) = result.outcome {
            set.extend(entries);
        }
    }

    let entries_seen = set.entries_seen();
    Aggregate {
        snapshot: set.into_snapshot(),
        entries_seen,
    }
}
