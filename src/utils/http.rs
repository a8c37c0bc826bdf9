// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &SourceConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET a URL and return the body as text.
///
/// Non-success statuses become [`AppError::HttpStatus`] so callers can
/// classify them without inspecting the body.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    check_status(url, response.status())?;
    Ok(response.text().await?)
}

fn check_status(url: &str, status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(AppError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
    })
}
