//! `grabit integrity <path>` – print the integrity string of a local file.

use anyhow::Result;
use grabit_core::config::GrabitConfig;
use grabit_core::integrity::{Algorithm, Integrity};
use std::path::Path;

pub async fn run_integrity(path: &Path, algo: Option<Algorithm>, cfg: &GrabitConfig) -> Result<()> {
    let algorithm = match algo {
        Some(a) => a,
        None => cfg.algorithm()?,
    };
    let integrity = Integrity::of_file(path, algorithm)?;
    println!("{}  {}", integrity, path.display());
    Ok(())
}
