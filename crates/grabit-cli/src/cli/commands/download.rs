//! `grabit download` – materialize resources into a directory.

use anyhow::{Context, Result};
use grabit_core::config::GrabitConfig;
use grabit_core::lock::{DownloadOptions, Lock};
use grabit_core::resource::Origin;
use std::path::Path;

use super::fetch_context;

pub async fn run_download(lock_path: &Path, cfg: &GrabitConfig, opts: DownloadOptions) -> Result<()> {
    let lock = Lock::load(lock_path, false)?;
    std::fs::create_dir_all(&opts.dir)
        .with_context(|| format!("create dir: {}", opts.dir.display()))?;

    let ctx = fetch_context(cfg);
    let done = tokio::task::spawn_blocking(move || lock.download(&opts, &ctx)).await??;

    for m in &done {
        match &m.origin {
            Origin::Existing => println!("{}  (up to date)", m.path.display()),
            Origin::Fetched { url } => println!("{}  <- {}", m.path.display(), url),
        }
    }
    Ok(())
}
