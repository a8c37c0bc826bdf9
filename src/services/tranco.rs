// src/services/tranco.rs

//! Tranco list source.
//!
//! A daily list is resolved in two requests: the date is first mapped to a
//! list identifier, then the identifier's top-N CSV is downloaded.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{DayKey, SourceConfig};
use crate::utils::http;
use crate::utils::join_segments;

/// Anything that can produce the raw CSV payload for one day.
#[async_trait]
pub trait ListSource: Send + Sync {
    /// Fetch the raw `rank,domain` payload for `day`.
    async fn fetch_raw(&self, day: DayKey) -> Result<String>;
}

/// HTTP client for the public Tranco service.
#[derive(Clone)]
pub struct TrancoClient {
    client: Client,
    base_url: String,
    list_size: u32,
    subdomains: bool,
}

impl TrancoClient {
    pub fn new(client: Client, config: &SourceConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            list_size: config.list_size,
            subdomains: config.subdomains,
        }
    }

    /// Build a client with its own HTTP connection pool.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self::new(http::create_async_client(config)?, config))
    }

    fn list_id_url(&self, day: DayKey) -> Result<String> {
        let mut url = join_segments(&self.base_url, &["daily_list_id"])?;
        url.query_pairs_mut()
            .append_pair("date", &day.to_string())
            .append_pair("subdomains", if self.subdomains { "true" } else { "false" });
        Ok(url.into())
    }

    fn download_url(&self, list_id: &str) -> Result<String> {
        let size = self.list_size.to_string();
        Ok(join_segments(&self.base_url, &["download", list_id, &size])?.into())
    }

    /// Resolve the list identifier published for `day`.
    pub async fn list_id(&self, day: DayKey) -> Result<String> {
        let url = self.list_id_url(day)?;
        let body = http::fetch_text(&self.client, &url).await?;
        parse_list_id(day, &body)
    }
}

/// Extract the list identifier from a `daily_list_id` response body.
fn parse_list_id(day: DayKey, body: &str) -> Result<String> {
    let id = body.trim();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return Err(AppError::unavailable(day, "daily list is currently unavailable"));
    }
    Ok(id.to_string())
}

#[async_trait]
impl ListSource for TrancoClient {
    async fn fetch_raw(&self, day: DayKey) -> Result<String> {
        let list_id = self.list_id(day).await?;
        log::debug!("{} resolved to list {}", day, list_id);

        let url = self.download_url(&list_id)?;
        http::fetch_text(&self.client, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: &SourceConfig) -> TrancoClient {
        TrancoClient::new(Client::new(), config)
    }

    #[test]
    fn test_list_id_url() {
        let tranco = client(&SourceConfig::default());
        let day = DayKey::parse("2025-03-07").unwrap();
        assert_eq!(
            tranco.list_id_url(day).unwrap(),
            "https://tranco-list.eu/daily_list_id?date=2025-03-07&subdomains=false"
        );
    }

    #[test]
    fn test_list_id_url_with_subdomains() {
        let config = SourceConfig {
            subdomains: true,
            ..SourceConfig::default()
        };
        let day = DayKey::parse("2025-03-07").unwrap();
        assert!(client(&config).list_id_url(day).unwrap().ends_with("subdomains=true"));
    }

    #[test]
    fn test_parse_list_id() {
        let day = DayKey::parse("2025-03-07").unwrap();
        assert_eq!(parse_list_id(day, "Z2KNG").unwrap(), "Z2KNG");
        assert_eq!(parse_list_id(day, "Z2KNG\n").unwrap(), "Z2KNG");
    }

    #[test]
    fn test_unusable_list_id_is_permanent() {
        let day = DayKey::parse("2025-03-07").unwrap();
        for body in ["", "  \r\n", "<html> not found </html>"] {
            let err = parse_list_id(day, body).unwrap_err();
            assert!(matches!(err, AppError::Source { .. }), "{body:?}: {err}");
            assert!(!err.is_transient());
        }
    }

    #[test]
    fn test_download_url_uses_list_size() {
        let config = SourceConfig {
            base_url: "http://localhost:9000/tranco/".into(),
            list_size: 1000,
            ..SourceConfig::default()
        };
        assert_eq!(
            client(&config).download_url("Z2KNG").unwrap(),
            "http://localhost:9000/tranco/download/Z2KNG/1000"
        );
    }
}
