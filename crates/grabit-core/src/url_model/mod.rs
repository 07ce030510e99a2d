//! Local file naming.
//!
//! Pure functions mapping a resource's filename override and a mirror URL to
//! the name the file receives in the target directory, plus the hidden
//! staging name a transfer is written to before it is verified.

mod path;

pub use path::filename_from_url_path;

use crate::error::{GrabError, Result};
use sha2::{Digest, Sha256};

/// Name of the file in the target directory for a download from `url`.
///
/// The override wins when set (and non-empty); otherwise the last path segment
/// of `url`. Either way the result must be a single, ordinary path component.
///
/// # Examples
///
/// - `local_name(None, "https://example.com/dl/tool-1.2.tar.gz")` → `"tool-1.2.tar.gz"`
/// - `local_name(Some("tool.tgz"), "https://example.com/dl/tool-1.2.tar.gz")` → `"tool.tgz"`
pub fn local_name(filename: Option<&str>, url: &str) -> Result<String> {
    if let Some(name) = filename.filter(|n| !n.is_empty()) {
        check_component(name)?;
        return Ok(name.to_string());
    }
    let name = filename_from_url_path(url)?;
    check_component(&name)?;
    Ok(name)
}

/// Hidden, per-URL staging file name: `.` followed by the hex SHA-256 of the URL.
/// Deterministic so runs for different URLs in the same directory never collide.
pub fn staging_name(url: &str) -> String {
    format!(".{}", hex::encode(Sha256::digest(url.as_bytes())))
}

fn check_component(name: &str) -> Result<()> {
    let bad = name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(GrabError::InvalidFilename(name.to_string()));
    }
    Ok(())
}
