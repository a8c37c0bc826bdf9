// src/error.rs

//! Unified error handling for the downloader.

use std::fmt;

use thiserror::Error;

/// Result type alias for downloader operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The ranking service has no usable list for a day
    #[error("Source error for {day}: {message}")]
    Source { day: String, message: String },

    /// A daily list payload could not be parsed
    #[error("Malformed list at line {line}: {message}")]
    MalformedList { line: usize, message: String },

    /// Every day in the window failed to fetch
    #[error("All {total} daily fetches failed; refusing to write an empty snapshot")]
    AllFetchesFailed { total: usize },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a source error for a given day.
    pub fn unavailable(day: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Source {
            day: day.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-payload error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedList {
            line,
            message: message.into(),
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, connection failures, rate limiting, "list still being
    /// generated" (403) and server errors are transient. Everything else,
    /// including malformed payloads and missing lists, is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                if let Some(status) = e.status() {
                    return is_transient_status(status.as_u16());
                }
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            Self::HttpStatus { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }
}

fn is_transient_status(status: u16) -> bool {
    status == 403 || status == 408 || status == 429 || (500..600).contains(&status)
}
