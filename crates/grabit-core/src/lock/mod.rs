//! Lock registry: the ordered list of pinned resources backing a lock file.
//!
//! Loaded once per command, mutated in memory, written back with `save`.
//! Resources are addressed by URL membership, not by integrity or tags.

mod filter;
mod persist;

pub use filter::TagFilter;

use crate::error::{GrabError, Result};
use crate::fetch::FetchContext;
use crate::integrity::{self, Algorithm, Integrity};
use crate::resource::{Materialized, Resource};
use crate::url_model::local_name;
use std::path::{Path, PathBuf};

/// Per-invocation download settings.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub dir: PathBuf,
    pub filter: TagFilter,
    /// Permission bits for materialized files; `None` leaves them alone.
    pub mode: Option<u32>,
}

impl DownloadOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            filter: TagFilter::default(),
            mode: None,
        }
    }
}

/// Offline check result for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub resource: String,
    /// The local file that satisfies the pin, if any.
    pub valid_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Lock {
    path: PathBuf,
    resources: Vec<Resource>,
}

impl Lock {
    fn empty(path: PathBuf) -> Self {
        Lock {
            path,
            resources: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn contains(&self, url: &str) -> bool {
        self.resources.iter().any(|r| r.contains(url))
    }

    /// Resources passing `filter`, in lock order.
    pub fn select<'a>(&'a self, filter: &'a TagFilter) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |r| filter.matches(&r.tags))
    }

    /// Adds a resource whose integrity is computed by downloading the first URL.
    pub fn add_resource(
        &mut self,
        urls: Vec<String>,
        algorithm: Algorithm,
        tags: Vec<String>,
        filename: Option<String>,
        ctx: &FetchContext,
    ) -> Result<&Resource> {
        self.check_new_urls(&urls)?;
        let resource = Resource::new_from_url(urls, algorithm, tags, filename, ctx)?;
        tracing::info!(
            resource = resource.display_name(),
            integrity = %resource.integrity,
            "added resource"
        );
        self.resources.push(resource);
        Ok(&self.resources[self.resources.len() - 1])
    }

    /// Adds a resource with a caller-supplied integrity. No network access.
    pub fn add_pinned(&mut self, resource: Resource) -> Result<()> {
        self.check_new_urls(&resource.urls)?;
        Integrity::parse(&resource.integrity)?;
        self.resources.push(resource);
        Ok(())
    }

    fn check_new_urls(&self, urls: &[String]) -> Result<()> {
        if urls.is_empty() {
            return Err(GrabError::EmptyUrlList);
        }
        if let Some(dup) = urls.iter().find(|u| self.contains(u)) {
            return Err(GrabError::DuplicateUrl(dup.clone()));
        }
        Ok(())
    }

    /// Removes every resource listing `url`. Returns how many were removed.
    pub fn delete_resource(&mut self, url: &str) -> usize {
        let before = self.resources.len();
        self.resources.retain(|r| !r.contains(url));
        let removed = before - self.resources.len();
        if removed == 0 {
            tracing::debug!(url, "no resource to delete");
        }
        removed
    }

    /// Downloads every selected resource, one at a time, in lock order.
    ///
    /// The first failing resource aborts the batch; files already placed stay.
    pub fn download(
        &self,
        opts: &DownloadOptions,
        ctx: &FetchContext,
    ) -> Result<Vec<Materialized>> {
        let mut done = Vec::new();
        for resource in self.select(&opts.filter) {
            let m = resource
                .download(&opts.dir, opts.mode, ctx)
                .map_err(|e| name_resource(resource, e))?;
            done.push(m);
        }
        tracing::info!(count = done.len(), dir = %opts.dir.display(), "download complete");
        Ok(done)
    }

    /// Checks, without network access, which selected resources already have a
    /// valid file in `dir`.
    pub fn verify(&self, dir: &Path, filter: &TagFilter) -> Vec<Verification> {
        self.select(filter)
            .map(|r| Verification {
                resource: r.display_name().to_string(),
                valid_path: r
                    .urls
                    .iter()
                    .filter_map(|u| local_name(r.filename.as_deref(), u).ok())
                    .map(|name| dir.join(name))
                    .find(|p| integrity::verify(p, &r.integrity)),
            })
            .collect()
    }
}

fn name_resource(resource: &Resource, e: GrabError) -> GrabError {
    match e {
        GrabError::Resource { .. } => e,
        other => GrabError::Resource {
            name: resource.display_name().to_string(),
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned(url: &str, tags: &[&str]) -> Resource {
        Resource {
            urls: vec![url.to_string()],
            integrity: "sha256-WJG1tSLV3whtD/CxEPvZ0hu0/HFjrzTQgoai6Eb2vgM=".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            filename: None,
        }
    }

    fn lock_in(dir: &Path) -> Lock {
        Lock::load(dir.join("grabit.lock"), true).unwrap()
    }

    #[test]
    fn add_contains_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = lock_in(dir.path());
        lock.add_pinned(pinned("http://h/a.txt", &[])).unwrap();
        assert!(lock.contains("http://h/a.txt"));
        assert_eq!(lock.delete_resource("http://h/a.txt"), 1);
        assert!(!lock.contains("http://h/a.txt"));
        assert_eq!(lock.delete_resource("http://h/a.txt"), 0);
    }

    #[test]
    fn delete_removes_every_resource_listing_the_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = lock_in(dir.path());
        lock.add_pinned(pinned("http://h/a.txt", &[])).unwrap();
        lock.resources.push(Resource {
            urls: vec!["http://mirror/a.txt".into(), "http://shared/a.txt".into()],
            ..pinned("http://unused", &[])
        });
        lock.resources.push(pinned("http://shared/a.txt", &[]));
        assert_eq!(lock.delete_resource("http://shared/a.txt"), 2);
        assert_eq!(lock.resources().len(), 1);
    }

    #[test]
    fn add_rejects_duplicates_and_bad_pins() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = lock_in(dir.path());
        lock.add_pinned(pinned("http://h/a.txt", &[])).unwrap();
        assert!(matches!(
            lock.add_pinned(pinned("http://h/a.txt", &[])),
            Err(GrabError::DuplicateUrl(_))
        ));
        let mut bad = pinned("http://h/b.txt", &[]);
        bad.integrity = "nonsense".into();
        assert!(matches!(
            lock.add_pinned(bad),
            Err(GrabError::MalformedIntegrity { .. })
        ));
        let empty = Resource {
            urls: Vec::new(),
            ..pinned("x", &[])
        };
        assert!(matches!(lock.add_pinned(empty), Err(GrabError::EmptyUrlList)));
    }

    #[test]
    fn add_resource_checks_duplicates_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = lock_in(dir.path());
        lock.add_pinned(pinned("http://127.0.0.1:9/a.txt", &[])).unwrap();
        let err = lock
            .add_resource(
                vec!["http://127.0.0.1:9/a.txt".into()],
                Algorithm::RECOMMENDED,
                Vec::new(),
                None,
                &FetchContext::new(),
            )
            .unwrap_err();
        assert!(matches!(err, GrabError::DuplicateUrl(_)));
    }

    #[test]
    fn select_keeps_lock_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = lock_in(dir.path());
        lock.add_pinned(pinned("http://h/1", &["a"])).unwrap();
        lock.add_pinned(pinned("http://h/2", &["b"])).unwrap();
        lock.add_pinned(pinned("http://h/3", &["a", "c"])).unwrap();
        let filter = TagFilter::new(vec!["a".into()], Vec::new());
        let urls: Vec<&str> = lock.select(&filter).map(|r| r.urls[0].as_str()).collect();
        assert_eq!(urls, vec!["http://h/1", "http://h/3"]);
    }

    #[test]
    fn verify_reports_valid_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = lock_in(dir.path());
        lock.add_pinned(pinned("http://h/present.txt", &[])).unwrap();
        lock.add_pinned(pinned("http://h/absent.txt", &[])).unwrap();
        std::fs::write(dir.path().join("present.txt"), b"hello\n").unwrap();

        let report = lock.verify(dir.path(), &TagFilter::default());
        assert_eq!(report.len(), 2);
        assert_eq!(
            report[0].valid_path.as_deref(),
            Some(dir.path().join("present.txt").as_path())
        );
        assert!(report[1].valid_path.is_none());
    }
}
