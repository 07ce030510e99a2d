//! Single HTTP GET of a URL into a local file.
//!
//! Uses the curl crate (libcurl). Blocking; call from `spawn_blocking` if used
//! from async code. Transport failures come back as `GrabError::Fetch` so the
//! caller can move on to the next mirror.

mod context;

pub use context::FetchContext;

use crate::error::{GrabError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const USER_AGENT: &str = concat!("grabit/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: u32 = 10;

fn fetch_error(url: &str, cause: impl Into<String>) -> GrabError {
    GrabError::Fetch {
        url: url.to_string(),
        cause: cause.into(),
    }
}

/// Downloads `url` into `dest`, creating or truncating it, and returns `dest`.
///
/// On failure the partial file is removed (a crash can still leave one behind;
/// it never passes verification).
pub fn fetch(url: &str, dest: &Path, ctx: &FetchContext) -> Result<PathBuf> {
    url::Url::parse(url).map_err(|e| GrabError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if let Some(reason) = ctx.stop_reason() {
        return Err(fetch_error(url, reason));
    }

    tracing::debug!(url, dest = %dest.display(), "downloading");
    let file = File::create(dest).map_err(|e| GrabError::io("create", dest, e))?;
    match transfer(url, file, dest, ctx) {
        Ok(bytes) => {
            tracing::debug!(url, bytes, "downloaded");
            Ok(dest.to_path_buf())
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(dest) {
                tracing::debug!(path = %dest.display(), "could not remove partial file: {}", rm);
            }
            Err(e)
        }
    }
}

/// Downloads `url` into a fresh temp file outside any target directory.
/// The file is deleted when the returned handle is dropped.
pub fn fetch_to_temp(url: &str, ctx: &FetchContext) -> Result<tempfile::NamedTempFile> {
    let tmp = tempfile::Builder::new()
        .prefix(".grabit-pin-")
        .tempfile()
        .map_err(|e| GrabError::io("create", std::env::temp_dir(), e))?;
    fetch(url, tmp.path(), ctx)?;
    Ok(tmp)
}

fn transfer(url: &str, file: File, dest: &Path, ctx: &FetchContext) -> Result<u64> {
    let curl_err = |e: curl::Error| fetch_error(url, e.to_string());

    let mut writer = BufWriter::new(file);
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(MAX_REDIRECTS).map_err(curl_err)?;
    easy.useragent(USER_AGENT).map_err(curl_err)?;
    // Needed for the progress callback below, which is our cancellation hook.
    easy.progress(true).map_err(curl_err)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: */*").map_err(curl_err)?;
    easy.http_headers(list).map_err(curl_err)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match writer.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(curl_err)?;
        transfer
            .progress_function(|_, _, _, _| ctx.stop_reason().is_none())
            .map_err(curl_err)?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(GrabError::io("write", dest, e));
    }
    if let Err(e) = performed {
        if e.is_aborted_by_callback() {
            return Err(fetch_error(url, ctx.stop_reason().unwrap_or("aborted")));
        }
        return Err(curl_err(e));
    }

    // 0 for schemes without a status line.
    let code = easy.response_code().map_err(curl_err)?;
    if code != 0 && !(200..300).contains(&code) {
        return Err(fetch_error(url, format!("HTTP {}", code)));
    }

    writer
        .flush()
        .map_err(|e| GrabError::io("write", dest, e))?;
    Ok(written)
}
