//! `grabit add <url>...` – pin a new resource in the lock file.

use anyhow::Result;
use grabit_core::config::GrabitConfig;
use grabit_core::integrity::Algorithm;
use grabit_core::lock::Lock;
use grabit_core::resource::Resource;
use std::path::Path;

use super::fetch_context;

pub async fn run_add(
    lock_path: &Path,
    cfg: &GrabitConfig,
    urls: Vec<String>,
    algo: Option<Algorithm>,
    tags: Vec<String>,
    filename: Option<String>,
    integrity: Option<String>,
) -> Result<()> {
    let mut lock = Lock::load(lock_path, true)?;

    let lock = match integrity {
        Some(integrity) => {
            if algo.is_some() {
                tracing::warn!("--algo ignored: integrity given explicitly");
            }
            lock.add_pinned(Resource {
                urls,
                integrity,
                tags,
                filename,
            })?;
            lock
        }
        None => {
            let algorithm = match algo {
                Some(a) => a,
                None => cfg.algorithm()?,
            };
            let ctx = fetch_context(cfg);
            tokio::task::spawn_blocking(move || -> grabit_core::Result<Lock> {
                lock.add_resource(urls, algorithm, tags, filename, &ctx)?;
                Ok(lock)
            })
            .await??
        }
    };

    lock.save()?;
    if let Some(r) = lock.resources().last() {
        println!("Added {} ({})", r.display_name(), r.integrity);
    }
    Ok(())
}
