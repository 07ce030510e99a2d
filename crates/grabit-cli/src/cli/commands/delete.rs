//! `grabit delete <url>...` – remove resources from the lock file.

use anyhow::Result;
use grabit_core::lock::Lock;
use std::path::Path;

/// Removes every resource listing any of `urls`. Unknown URLs are not an error.
pub async fn run_delete(lock_path: &Path, urls: &[String]) -> Result<()> {
    let mut lock = Lock::load(lock_path, false)?;
    let removed: usize = urls.iter().map(|u| lock.delete_resource(u)).sum();
    lock.save()?;
    println!("Removed {removed} resource(s)");
    Ok(())
}
