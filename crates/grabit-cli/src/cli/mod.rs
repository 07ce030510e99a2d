//! CLI for grabit.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use grabit_core::config;
use grabit_core::integrity::Algorithm;
use grabit_core::lock::{DownloadOptions, TagFilter};
use std::path::PathBuf;

use commands::{
    run_add, run_completions, run_delete, run_download, run_integrity, run_list, run_verify,
};

/// Top-level CLI for grabit.
#[derive(Debug, Parser)]
#[command(name = "grabit", version)]
#[command(about = "grabit: download pinned resources and verify their integrity", long_about = None)]
pub struct Cli {
    /// Lock file to read and update (default from config, usually ./grabit.lock).
    #[arg(short = 'f', long, global = true, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "info,grabit_core=trace").
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Add a resource; its integrity is computed from the first URL unless given.
    Add {
        /// Mirror URLs, in fallback order.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Digest algorithm (sha256, sha384, sha512).
        #[arg(long)]
        algo: Option<Algorithm>,
        /// Tag to attach (repeatable).
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Local file name instead of the URL's last path segment.
        #[arg(long)]
        filename: Option<String>,
        /// Pinned integrity (e.g. sha256-...); skips downloading the first URL.
        #[arg(long)]
        integrity: Option<String>,
    },

    /// Delete every resource listing one of the given URLs.
    Delete {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Download resources into a directory, skipping files that are already valid.
    Download {
        /// Target directory (created if missing).
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Only resources with at least one of these tags (repeatable).
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Skip resources with any of these tags (repeatable).
        #[arg(long = "notag", value_name = "TAG")]
        notags: Vec<String>,
        /// Octal permission bits for downloaded files, e.g. 644.
        #[arg(long, value_parser = parse_mode)]
        perm: Option<u32>,
    },

    /// Check already-downloaded files against the lock without network access.
    Verify {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        #[arg(long = "notag", value_name = "TAG")]
        notags: Vec<String>,
    },

    /// List resources in the lock file.
    List {
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        #[arg(long = "notag", value_name = "TAG")]
        notags: Vec<String>,
    },

    /// Print the integrity string of a local file.
    Integrity {
        path: PathBuf,
        #[arg(long)]
        algo: Option<Algorithm>,
    },

    /// Generate shell completions.
    Completions { shell: clap_complete::Shell },
}

/// Parses octal permission bits ("644", "0755", "0o600").
fn parse_mode(s: &str) -> std::result::Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    let mode = u32::from_str_radix(digits, 8).map_err(|_| format!("'{}' is not an octal mode", s))?;
    if mode > 0o777 {
        return Err(format!("mode {:o} out of range (max 777)", mode));
    }
    Ok(mode)
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let lock_path = self.lock_file.unwrap_or_else(|| cfg.lock_file.clone());

        match self.command {
            CliCommand::Add {
                urls,
                algo,
                tags,
                filename,
                integrity,
            } => run_add(&lock_path, &cfg, urls, algo, tags, filename, integrity).await?,
            CliCommand::Delete { urls } => run_delete(&lock_path, &urls).await?,
            CliCommand::Download {
                dir,
                tags,
                notags,
                perm,
            } => {
                let opts = DownloadOptions {
                    dir,
                    filter: TagFilter::new(tags, notags),
                    mode: perm,
                };
                run_download(&lock_path, &cfg, opts).await?
            }
            CliCommand::Verify { dir, tags, notags } => {
                run_verify(&lock_path, &dir, &TagFilter::new(tags, notags)).await?
            }
            CliCommand::List { tags, notags } => {
                run_list(&lock_path, &TagFilter::new(tags, notags)).await?
            }
            CliCommand::Integrity { path, algo } => run_integrity(&path, algo, &cfg).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
