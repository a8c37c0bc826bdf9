//! Utility functions and helpers.

pub mod backoff;
pub mod http;
pub mod log;

use url::Url;

/// Append path segments to a base URL, keeping any existing base path.
pub fn join_segments(base: &str, segments: &[&str]) -> crate::error::Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| crate::error::AppError::config(format!("URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
