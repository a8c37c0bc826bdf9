//! Daily list entries and per-day fetch outcomes.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::DayKey;

/// One `(rank, domain)` pair from a single day's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: u32,
    pub domain: Box<str>,
}

impl RankedEntry {
    pub fn new(rank: u32, domain: impl Into<Box<str>>) -> Self {
        Self {
            rank,
            domain: domain.into(),
        }
    }
}

/// Parse a Tranco CSV payload (`rank,domain` per line).
///
/// Blank lines are skipped and `\r\n` endings are accepted. Any other
/// irregularity rejects the whole payload. Domains are kept verbatim.
pub fn parse_list(payload: &str) -> Result<Vec<RankedEntry>> {
    let mut entries = Vec::new();

    for (idx, raw) in payload.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let line_no = idx + 1;
        let (rank, domain) = line
            .split_once(',')
            .ok_or_else(|| AppError::malformed(line_no, "expected 'rank,domain'"))?;

        let rank: u32 = rank
            .trim()
            .parse()
            .map_err(|e| AppError::malformed(line_no, format!("bad rank '{rank}': {e}")))?;

        let domain = domain.trim();
        if domain.is_empty() {
            return Err(AppError::malformed(line_no, "empty domain"));
        }

        entries.push(RankedEntry::new(rank, domain));
    }

    if entries.is_empty() {
        return Err(AppError::malformed(0, "list contains no entries"));
    }

    // Every fetched day stays resident until aggregation.
    entries.shrink_to_fit();
    Ok(entries)
}

/// Why a day could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub day: DayKey,
    pub reason: String,
    pub attempts: u32,
}

/// Outcome of fetching one day.
#[derive(Debug)]
pub struct FetchResult {
    pub day: DayKey,
    pub outcome: std::result::Result<Vec<RankedEntry>, FetchFailure>,
}

impl FetchResult {
    pub fn success(day: DayKey, entries: Vec<RankedEntry>) -> Self {
        Self {
            day,
            outcome: Ok(entries),
        }
    }

    pub fn failure(day: DayKey, reason: impl Into<String>, attempts: u32) -> Self {
        Self {
            day,
            outcome: Err(FetchFailure {
                day,
                reason: reason.into(),
                attempts,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn failure_info(&self) -> Option<&FetchFailure> {
        self.outcome.as_ref().err()
    }

    /// Number of entries on success, zero on failure.
    pub fn entry_count(&self) -> usize {
        self.outcome.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crlf_and_blank_lines() {
        let entries = parse_list("1,google.com\r\n2,Example.ORG\r\n\r\n3,a.b.c\n").unwrap();
        assert_eq!(
            entries,
            vec![
                RankedEntry::new(1, "google.com"),
                RankedEntry::new(2, "Example.ORG"),
                RankedEntry::new(3, "a.b.c"),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_source_order_and_duplicates() {
        let entries = parse_list("2,b.com\n1,a.com\n3,b.com\n").unwrap();
        let domains: Vec<&str> = entries.iter().map(|e| &*e.domain).collect();
        assert_eq!(domains, vec!["b.com", "a.com", "b.com"]);
    }

    #[test]
    fn test_entry_stays_compact() {
        assert!(std::mem::size_of::<RankedEntry>() <= 24);

        let entries = parse_list("1,a.com\n2,b.com\n3,c.com\n").unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(&*entries[2].domain, "c.com");
    }

    #[test]
    fn test_parse_rejects_missing_comma() {
        let err = parse_list("1,ok.com\n<html>oops</html>\n").unwrap_err();
        assert!(matches!(err, AppError::MalformedList { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_bad_rank() {
        assert!(parse_list("one,ok.com\n").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_domain() {
        assert!(parse_list("1,\n").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_payload() {
        assert!(parse_list("").is_err());
        assert!(parse_list("\n\r\n").is_err());
    }

    #[test]
    fn test_fetch_result_accessors() {
        let day = DayKey::parse("2025-01-03").unwrap();
        let ok = FetchResult::success(day, vec![RankedEntry::new(1, "a.com")]);
        assert!(ok.is_success());
        assert_eq!(ok.entry_count(), 1);

        let failed = FetchResult::failure(day, "timeout", 4);
        assert!(!failed.is_success());
        assert_eq!(failed.entry_count(), 0);
        assert_eq!(failed.failure_info().unwrap().attempts, 4);
    }
}
