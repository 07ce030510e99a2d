//! Integrity strings: `<algorithm>-<base64 digest>`, e.g. `sha256-47DEQpj8...`.
//!
//! Parsing, streaming digest computation and verification of files on disk.
//! Digests are computed on demand, never inline with a transfer.

use crate::error::{GrabError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;
const SEPARATOR: char = '-';

/// Hash functions accepted in an integrity string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    /// Used when a resource is added without a pinned digest.
    pub const RECOMMENDED: Algorithm = Algorithm::Sha256;

    pub const ALL: [Algorithm; 3] = [Algorithm::Sha256, Algorithm::Sha384, Algorithm::Sha512];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::RECOMMENDED
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Algorithm::ALL.iter().map(|a| a.name()).collect();
                format!("unsupported algorithm '{}' (supported: {})", s, known.join(", "))
            })
    }
}

/// A parsed integrity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integrity {
    algorithm: Algorithm,
    digest: String,
}

impl Integrity {
    /// Splits on the first `-`. The digest part is kept verbatim; a digest that is not
    /// valid base64 simply never matches any file.
    pub fn parse(s: &str) -> Result<Self> {
        let malformed = |reason: String| GrabError::MalformedIntegrity {
            integrity: s.to_string(),
            reason,
        };
        let (algo, digest) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| malformed(format!("missing '{}' separator", SEPARATOR)))?;
        let algorithm = algo.parse::<Algorithm>().map_err(malformed)?;
        if digest.is_empty() {
            return Err(malformed("empty digest".to_string()));
        }
        Ok(Integrity {
            algorithm,
            digest: digest.to_string(),
        })
    }

    /// Computes the integrity of the file at `path` under `algorithm`.
    pub fn of_file(path: &Path, algorithm: Algorithm) -> Result<Self> {
        Ok(Integrity {
            algorithm,
            digest: digest_of(path, algorithm)?,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// True only if the file exists, is readable and hashes to this digest.
    pub fn matches_file(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        match digest_of(path, self.algorithm) {
            Ok(d) => d == self.digest,
            Err(e) => {
                tracing::debug!(path = %path.display(), "cannot verify: {}", e);
                false
            }
        }
    }
}

impl fmt::Display for Integrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.algorithm, SEPARATOR, self.digest)
    }
}

impl FromStr for Integrity {
    type Err = GrabError;

    fn from_str(s: &str) -> Result<Self> {
        Integrity::parse(s)
    }
}

/// Streams the file at `path` through `algorithm` and returns the base64 digest.
pub fn digest_of(path: &Path, algorithm: Algorithm) -> Result<String> {
    let file = File::open(path).map_err(|e| GrabError::io("open", path, e))?;
    let raw = match algorithm {
        Algorithm::Sha256 => hash_reader::<Sha256>(file, path)?,
        Algorithm::Sha384 => hash_reader::<Sha384>(file, path)?,
        Algorithm::Sha512 => hash_reader::<Sha512>(file, path)?,
    };
    Ok(STANDARD.encode(raw))
}

fn hash_reader<D: Digest>(mut f: File, path: &Path) -> Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf).map_err(|e| GrabError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

/// Returns whether the file at `path` satisfies `integrity`. Any failure
/// (unparseable pin, missing or unreadable file) counts as not valid.
pub fn verify(path: &Path, integrity: &str) -> bool {
    match Integrity::parse(integrity) {
        Ok(i) => i.matches_file(path),
        Err(_) => false,
    }
}
