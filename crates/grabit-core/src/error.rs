//! Error type shared by the digest codec, fetcher, resource and lock registry.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrabError>;

#[derive(Debug, Error)]
pub enum GrabError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport failure for one mirror (DNS, connect, HTTP status, cancellation).
    #[error("failed to download '{url}': {cause}")]
    Fetch { url: String, cause: String },

    #[error("malformed integrity '{integrity}': {reason}")]
    MalformedIntegrity { integrity: String, reason: String },

    #[error("integrity mismatch for '{url}': expected {expected}, got {actual}")]
    IntegrityMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lock file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("invalid file name '{0}': must be a single path component")]
    InvalidFilename(String),

    #[error("empty url list")]
    EmptyUrlList,

    #[error("resource '{0}' is already present")]
    DuplicateUrl(String),

    #[error("lock file '{}': {reason}", .path.display())]
    LockFormat { path: PathBuf, reason: String },

    /// Failure attributed to one resource; for exhausted mirrors `source` is the last mirror's error.
    #[error("resource '{name}': {source}")]
    Resource {
        name: String,
        #[source]
        source: Box<GrabError>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl GrabError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrabError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// True when the next mirror of the same resource may still succeed.
    /// Only transport failures qualify; integrity and filesystem errors never do.
    pub fn is_mirror_recoverable(&self) -> bool {
        matches!(self, GrabError::Fetch { .. })
    }

    /// Strips `Resource` wrappers and returns the underlying error.
    pub fn root(&self) -> &GrabError {
        match self {
            GrabError::Resource { source, .. } => source.root(),
            other => other,
        }
    }
}
