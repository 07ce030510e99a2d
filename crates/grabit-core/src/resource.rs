//! A pinned resource: candidate mirror URLs plus the integrity they must satisfy.
//!
//! `Resource::download` is the engine: reuse a valid local file, otherwise try
//! mirrors in order, verify the staged transfer and rename it into place.

use crate::error::{GrabError, Result};
use crate::fetch::{self, FetchContext};
use crate::integrity::{Algorithm, Integrity};
use crate::url_model::{local_name, staging_name};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    /// Mirrors, tried in order.
    pub urls: Vec<String>,
    pub integrity: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub filename: Option<String>,
}

fn is_blank(name: &Option<String>) -> bool {
    name.as_deref().map_or(true, str::is_empty)
}

/// Where a materialized file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A file already at the final path matched the pin; nothing was fetched.
    Existing,
    /// Fetched from this mirror.
    Fetched { url: String },
}

/// A resource file present and verified in the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub path: PathBuf,
    pub origin: Origin,
}

impl Resource {
    /// Builds a resource by downloading the first URL to a throwaway temp file
    /// and pinning its digest under `algorithm`.
    pub fn new_from_url(
        urls: Vec<String>,
        algorithm: Algorithm,
        tags: Vec<String>,
        filename: Option<String>,
        ctx: &FetchContext,
    ) -> Result<Self> {
        let first = urls.first().ok_or(GrabError::EmptyUrlList)?;
        let sample = fetch::fetch_to_temp(first, ctx)?;
        let integrity = Integrity::of_file(sample.path(), algorithm)?;
        tracing::debug!(url = %first, %integrity, "computed integrity");
        Ok(Resource {
            urls,
            integrity: integrity.to_string(),
            tags,
            filename,
        })
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    /// Human-readable name used in errors: the filename override, else the first URL.
    pub fn display_name(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.urls.first().map(String::as_str).unwrap_or("<no url>"),
        }
    }

    /// Makes this resource present and valid in `dir`.
    ///
    /// Mirror transport failures fall through to the next URL; an integrity
    /// mismatch or filesystem error stops immediately. `mode`, when set, is
    /// applied to the final file (also on reuse).
    pub fn download(
        &self,
        dir: &Path,
        mode: Option<u32>,
        ctx: &FetchContext,
    ) -> Result<Materialized> {
        let integrity = Integrity::parse(&self.integrity)?;
        let mut last_err: Option<GrabError> = None;

        for attempt in self.attempts(dir) {
            let Attempt {
                url,
                final_path,
                check_existing,
            } = attempt?;

            if check_existing && integrity.matches_file(&final_path) {
                tracing::info!(path = %final_path.display(), "using existing valid file");
                apply_mode(&final_path, mode)?;
                return Ok(Materialized {
                    path: final_path,
                    origin: Origin::Existing,
                });
            }

            // Stage inside `dir` so the rename below stays on one filesystem.
            let staging = dir.join(staging_name(url));
            if let Err(e) = fetch::fetch(url, &staging, ctx) {
                if e.is_mirror_recoverable() {
                    tracing::warn!(url = %url, "mirror failed: {}", e);
                    last_err = Some(e);
                    continue;
                }
                return Err(e);
            }

            if let Err(e) = check_staged(&staging, &integrity, url) {
                discard(&staging);
                return Err(e);
            }
            if let Err(e) = place(&staging, &final_path) {
                discard(&staging);
                return Err(e);
            }
            apply_mode(&final_path, mode)?;
            tracing::info!(url = %url, path = %final_path.display(), "downloaded");
            return Ok(Materialized {
                path: final_path,
                origin: Origin::Fetched {
                    url: url.to_string(),
                },
            });
        }

        match last_err {
            Some(e) => Err(GrabError::Resource {
                name: self.display_name().to_string(),
                source: Box::new(e),
            }),
            None => Err(GrabError::Internal(format!(
                "resource '{}' has no urls to try",
                self.display_name()
            ))),
        }
    }
}

/// One mirror to try and the local path it would land at.
#[derive(Debug)]
struct Attempt<'a> {
    url: &'a str,
    final_path: PathBuf,
    /// False when an earlier mirror already checked this path for reuse.
    check_existing: bool,
}

impl Resource {
    /// Mirrors in order with their local paths. Names are derived lazily so an
    /// unusable later URL only fails once it is reached.
    fn attempts<'a>(&'a self, dir: &'a Path) -> impl Iterator<Item = Result<Attempt<'a>>> + 'a {
        let mut checked: Vec<PathBuf> = Vec::new();
        self.urls.iter().map(move |url| -> Result<Attempt<'a>> {
            let final_path = dir.join(local_name(self.filename.as_deref(), url)?);
            let check_existing = !checked.contains(&final_path);
            if check_existing {
                checked.push(final_path.clone());
            }
            Ok(Attempt {
                url,
                final_path,
                check_existing,
            })
        })
    }
}

fn check_staged(staging: &Path, integrity: &Integrity, url: &str) -> Result<()> {
    let actual = Integrity::of_file(staging, integrity.algorithm())?;
    if actual.digest() != integrity.digest() {
        return Err(GrabError::IntegrityMismatch {
            url: url.to_string(),
            expected: integrity.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Replaces `final_path` with `staging`. On Unix `rename` swaps atomically over
/// an existing file; elsewhere the stale file has to go first.
fn place(staging: &Path, final_path: &Path) -> Result<()> {
    #[cfg(not(unix))]
    {
        match fs::remove_file(final_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(GrabError::io("remove", final_path, e)),
        }
    }
    fs::rename(staging, final_path).map_err(|e| GrabError::io("rename", final_path, e))
}

fn discard(staging: &Path) {
    if let Err(e) = fs::remove_file(staging) {
        tracing::debug!(path = %staging.display(), "could not remove staged file: {}", e);
    }
}

fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    let Some(mode) = mode else {
        return Ok(());
    };
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
            .map_err(|e| GrabError::io("chmod", path, e))?;
    }
    #[cfg(not(unix))]
    tracing::debug!(path = %path.display(), mode, "file mode ignored on this platform");
    Ok(())
}
