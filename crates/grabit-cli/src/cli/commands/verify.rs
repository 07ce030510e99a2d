//! `grabit verify` – offline check of downloaded files against their pins.

use anyhow::Result;
use grabit_core::lock::{Lock, TagFilter};
use std::path::Path;

pub async fn run_verify(lock_path: &Path, dir: &Path, filter: &TagFilter) -> Result<()> {
    let lock = Lock::load(lock_path, false)?;
    let report = lock.verify(dir, filter);

    let mut bad = 0usize;
    for v in &report {
        match &v.valid_path {
            Some(p) => println!("ok       {}", p.display()),
            None => {
                bad += 1;
                println!("MISSING  {}", v.resource);
            }
        }
    }
    if bad > 0 {
        anyhow::bail!(
            "{} of {} resource(s) missing or invalid in {}",
            bad,
            report.len(),
            dir.display()
        );
    }
    Ok(())
}
