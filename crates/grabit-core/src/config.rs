use crate::integrity::Algorithm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default lock file name, relative to the working directory.
pub const DEFAULT_LOCK_FILE: &str = "grabit.lock";

/// User configuration loaded from `~/.config/grabit/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabitConfig {
    /// Lock file used when `--lock-file` is not given.
    pub lock_file: PathBuf,
    /// Digest algorithm for `add` when `--algo` is not given.
    pub algorithm: String,
    /// Optional deadline in seconds for a whole command's network activity (None = no deadline).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GrabitConfig {
    fn default() -> Self {
        Self {
            lock_file: PathBuf::from(DEFAULT_LOCK_FILE),
            algorithm: Algorithm::RECOMMENDED.name().to_string(),
            timeout_secs: None,
        }
    }
}

impl GrabitConfig {
    pub fn algorithm(&self) -> Result<Algorithm> {
        self.algorithm
            .parse::<Algorithm>()
            .map_err(|e| anyhow::anyhow!("config: {}", e))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("grabit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GrabitConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GrabitConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GrabitConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
