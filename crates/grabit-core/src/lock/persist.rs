//! Lock file (de)serialization: a TOML array of `[[Resource]]` tables.

use crate::error::{GrabError, Result};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::Lock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LockFile {
    #[serde(rename = "Resource", default, skip_serializing_if = "Vec::is_empty")]
    resources: Vec<Resource>,
}

impl Lock {
    /// Reads the lock file at `path`. A missing file yields an empty lock when
    /// `create_if_missing` is set (nothing is written until `save`), else `NotFound`.
    pub fn load(path: impl Into<PathBuf>, create_if_missing: bool) -> Result<Self> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if create_if_missing {
                    tracing::debug!(path = %path.display(), "starting new lock file");
                    return Ok(Lock::empty(path));
                }
                return Err(GrabError::NotFound(path));
            }
            Err(e) => return Err(GrabError::io("read", path, e)),
        };
        let file: LockFile = toml::from_str(&data).map_err(|e| GrabError::LockFormat {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(
            path = %path.display(),
            resources = file.resources.len(),
            "loaded lock file"
        );
        Ok(Lock {
            path,
            resources: file.resources,
        })
    }

    /// Writes the lock file atomically: temp file next to it, then rename.
    pub fn save(&self) -> Result<()> {
        let file = LockFile {
            resources: self.resources.clone(),
        };
        let body = toml::to_string_pretty(&file).map_err(|e| GrabError::LockFormat {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| GrabError::io("create", parent, e))?;
        tmp.write_all(body.as_bytes())
            .map_err(|e| GrabError::io("write", tmp.path().to_path_buf(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| GrabError::io("rename", &self.path, e.error))?;
        tracing::debug!(path = %self.path.display(), "saved lock file");
        Ok(())
    }
}
