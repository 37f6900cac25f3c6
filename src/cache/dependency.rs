//! File-state snapshot taken during a build.
//!
//! A cached response stays valid only while every file it read keeps its
//! modification time, every probed-but-missing file stays missing, and every
//! directory it listed yields the same listing.

use crate::vfs::{DirectoryListing, VirtualPathProvider};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    /// `None` records a probe that found nothing.
    files: Vec<(String, Option<SystemTime>)>,
    directories: Vec<(String, u64)>,
}

impl Dependencies {
    pub fn record_file(&mut self, virtual_path: &str, modified: Option<SystemTime>) {
        self.files.push((virtual_path.to_string(), modified));
    }

    pub fn record_directory(&mut self, virtual_path: &str, listing: &DirectoryListing) {
        self.directories
            .push((virtual_path.to_string(), fingerprint(listing)));
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Re-check every recorded observation against the provider.
    pub fn is_current(&self, provider: &dyn VirtualPathProvider) -> bool {
        let files_current = self.files.iter().all(|(path, modified)| {
            provider.get_file(path).map(|f| f.modified) == *modified
        });
        files_current
            && self.directories.iter().all(|(path, expected)| {
                provider
                    .list_directory(path)
                    .is_ok_and(|listing| fingerprint(&listing) == *expected)
            })
    }
}

/// Hash of a listing's names and modification times.
pub fn fingerprint(listing: &DirectoryListing) -> u64 {
    let mut hasher = FxHasher::default();
    for file in &listing.files {
        file.virtual_path.hash(&mut hasher);
        file.modified.hash(&mut hasher);
    }
    for dir in &listing.directories {
        dir.hash(&mut hasher);
    }
    hasher.finish()
}
