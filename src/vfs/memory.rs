//! In-memory provider.
//!
//! Directories are implied by the files beneath them, or declared with
//! [`MemoryFileProvider::add_directory`]. Each write bumps a generation
//! counter that stands in for the file's modification time.

use super::{DirectoryListing, VirtualFile, VirtualPathProvider, sort_listing};
use crate::vpath;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

/// Base of the synthetic clock (2023-11-14T22:13:20Z).
const EPOCH_OFFSET_SECS: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
struct Entry {
    virtual_path: String,
    content: Vec<u8>,
    modified: SystemTime,
}

/// Thread-safe in-memory file tree keyed by lowercased virtual path.
#[derive(Debug, Default)]
pub struct MemoryFileProvider {
    files: RwLock<BTreeMap<String, Entry>>,
    directories: RwLock<BTreeSet<String>>,
    generation: AtomicU64,
}

impl MemoryFileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> SystemTime {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(EPOCH_OFFSET_SECS + generation)
    }

    /// Add or overwrite a file. Its modification time always advances.
    pub fn add_file(&self, virtual_path: &str, content: impl Into<Vec<u8>>) {
        let modified = self.tick();
        self.files.write().insert(
            vpath::key(virtual_path),
            Entry {
                virtual_path: virtual_path.to_string(),
                content: content.into(),
                modified,
            },
        );
    }

    /// Declare a directory that may be empty.
    pub fn add_directory(&self, virtual_path: &str) {
        self.directories
            .write()
            .insert(vpath::key(&vpath::normalize_dir(virtual_path)));
    }

    /// Advance a file's modification time without changing its content.
    pub fn touch(&self, virtual_path: &str) -> bool {
        let modified = self.tick();
        match self.files.write().get_mut(&vpath::key(virtual_path)) {
            Some(entry) => {
                entry.modified = modified;
                true
            }
            None => false,
        }
    }

    pub fn remove_file(&self, virtual_path: &str) -> bool {
        self.files
            .write()
            .remove(&vpath::key(virtual_path))
            .is_some()
    }
}

impl VirtualPathProvider for MemoryFileProvider {
    fn file_exists(&self, virtual_path: &str) -> bool {
        self.files.read().contains_key(&vpath::key(virtual_path))
    }

    fn directory_exists(&self, virtual_path: &str) -> bool {
        let dir = vpath::key(&vpath::normalize_dir(virtual_path));
        if dir == vpath::ROOT || self.directories.read().contains(&dir) {
            return true;
        }
        let implied = |key: &String| key.starts_with(&dir);
        self.files.read().keys().any(implied) || self.directories.read().iter().any(implied)
    }

    fn get_file(&self, virtual_path: &str) -> Option<VirtualFile> {
        self.files
            .read()
            .get(&vpath::key(virtual_path))
            .map(|e| VirtualFile::new(e.virtual_path.clone(), e.modified))
    }

    fn read(&self, virtual_path: &str) -> io::Result<Vec<u8>> {
        self.files
            .read()
            .get(&vpath::key(virtual_path))
            .map(|e| e.content.clone())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("`{virtual_path}` not found"))
            })
    }

    fn list_directory(&self, virtual_path: &str) -> io::Result<DirectoryListing> {
        if !self.directory_exists(virtual_path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory `{virtual_path}` not found"),
            ));
        }
        let base = vpath::normalize_dir(virtual_path);
        let prefix = vpath::key(&base);

        let mut listing = DirectoryListing::default();
        let mut seen_dirs = BTreeSet::new();
        let mut push_dir = |segment: &str, listing: &mut DirectoryListing| {
            if seen_dirs.insert(segment.to_lowercase()) {
                listing.directories.push(format!("{base}{segment}/"));
            }
        };

        for (key, entry) in self.files.read().iter() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            // Recover original casing from the stored path.
            let start = entry.virtual_path.len().saturating_sub(rest.len());
            let original = entry.virtual_path.get(start..).unwrap_or(rest);
            match original.split_once('/') {
                None => listing
                    .files
                    .push(VirtualFile::new(entry.virtual_path.clone(), entry.modified)),
                Some((segment, _)) => push_dir(segment, &mut listing),
            }
        }
        for dir in self.directories.read().iter() {
            if let Some(rest) = dir.strip_prefix(&prefix)
                && let Some((segment, _)) = rest.split_once('/')
            {
                push_dir(segment, &mut listing);
            }
        }

        sort_listing(&mut listing);
        Ok(listing)
    }
}
