//! Filename extraction from URL path.

use crate::error::{GrabError, Result};

/// Extracts the last path segment from a URL.
///
/// Fails with `InvalidUrl` if the URL cannot be parsed or its path is empty/root.
/// Query and fragment are ignored.
pub fn filename_from_url_path(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).map_err(|e| GrabError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let segment = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .filter(|s| *s != "." && *s != "..")
        .ok_or_else(|| GrabError::InvalidUrl {
            url: url.to_string(),
            reason: "no file name in URL path; set a Filename".to_string(),
        })?;
    Ok(segment.to_string())
}
