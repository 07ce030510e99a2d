//! `grabit list` – show resources in the lock file.

use anyhow::Result;
use grabit_core::lock::{Lock, TagFilter};
use std::path::Path;

pub async fn run_list(lock_path: &Path, filter: &TagFilter) -> Result<()> {
    let lock = Lock::load(lock_path, false)?;
    for r in lock.select(filter) {
        println!("{}", r.display_name());
        println!("    integrity: {}", r.integrity);
        for url in &r.urls {
            println!("    url:       {}", url);
        }
        if !r.tags.is_empty() {
            println!("    tags:      {}", r.tags.join(", "));
        }
    }
    Ok(())
}
