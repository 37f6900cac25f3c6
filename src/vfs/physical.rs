//! Disk-backed provider mapping `~/` onto a root directory.

use super::{DirectoryListing, VirtualFile, VirtualPathProvider, sort_listing};
use crate::vpath;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Serves files from a physical directory.
#[derive(Debug, Clone)]
pub struct PhysicalFileProvider {
    root: PathBuf,
}

impl PhysicalFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual path to a physical one.
    ///
    /// Returns `None` for paths outside the root (`..` segments, absolute
    /// components).
    pub fn map_path(&self, virtual_path: &str) -> Option<PathBuf> {
        let rest = virtual_path
            .strip_prefix(vpath::ROOT)
            .or_else(|| (virtual_path == "~").then_some(""))?;
        let relative = Path::new(rest);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| self.root.join(relative))
    }
}

/// Get the modification time of a file
fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

fn not_found(virtual_path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("`{virtual_path}` is outside the application root"),
    )
}

impl VirtualPathProvider for PhysicalFileProvider {
    fn file_exists(&self, virtual_path: &str) -> bool {
        self.map_path(virtual_path).is_some_and(|p| p.is_file())
    }

    fn directory_exists(&self, virtual_path: &str) -> bool {
        self.map_path(virtual_path).is_some_and(|p| p.is_dir())
    }

    fn get_file(&self, virtual_path: &str) -> Option<VirtualFile> {
        let path = self.map_path(virtual_path)?;
        if !path.is_file() {
            return None;
        }
        let modified = get_mtime(&path)?;
        Some(VirtualFile::new(virtual_path, modified))
    }

    fn read(&self, virtual_path: &str) -> io::Result<Vec<u8>> {
        let path = self
            .map_path(virtual_path)
            .ok_or_else(|| not_found(virtual_path))?;
        fs::read(path)
    }

    fn list_directory(&self, virtual_path: &str) -> io::Result<DirectoryListing> {
        let dir = self
            .map_path(virtual_path)
            .ok_or_else(|| not_found(virtual_path))?;
        let base = vpath::normalize_dir(virtual_path);

        let mut listing = DirectoryListing::default();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                listing.directories.push(format!("{base}{name}/"));
            } else if let Some(modified) = get_mtime(&entry.path()) {
                listing
                    .files
                    .push(VirtualFile::new(format!("{base}{name}"), modified));
            }
        }
        sort_listing(&mut listing);
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PhysicalFileProvider) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("scripts/lib")).unwrap();
        fs::write(dir.path().join("scripts/b.js"), "b").unwrap();
        fs::write(dir.path().join("scripts/a.js"), "a").unwrap();
        fs::write(dir.path().join("scripts/lib/c.js"), "c").unwrap();
        let provider = PhysicalFileProvider::new(dir.path());
        (dir, provider)
    }

    #[test]
    fn test_exists() {
        let (_dir, provider) = setup();
        assert!(provider.file_exists("~/scripts/a.js"));
        assert!(!provider.file_exists("~/scripts/missing.js"));
        assert!(provider.directory_exists("~/scripts/"));
        assert!(provider.directory_exists("~/scripts/lib"));
        assert!(!provider.directory_exists("~/scripts/a.js"));
    }

    #[test]
    fn test_rejects_escape() {
        let (_dir, provider) = setup();
        assert!(provider.map_path("~/../etc/passwd").is_none());
        assert!(provider.map_path("/etc/passwd").is_none());
        assert!(!provider.file_exists("~/../scripts/a.js"));
    }

    #[test]
    fn test_list_directory_sorted() {
        let (_dir, provider) = setup();
        let listing = provider.list_directory("~/scripts").unwrap();
        let names: Vec<_> = listing.files.iter().map(|f| f.virtual_path.as_str()).collect();
        assert_eq!(names, ["~/scripts/a.js", "~/scripts/b.js"]);
        assert_eq!(listing.directories, ["~/scripts/lib/"]);
    }

    #[test]
    fn test_read_and_get_file() {
        let (_dir, provider) = setup();
        assert_eq!(provider.read("~/scripts/lib/c.js").unwrap(), b"c");
        let file = provider.get_file("~/scripts/a.js").unwrap();
        assert_eq!(file.name(), "a.js");
        assert!(provider.get_file("~/scripts/").is_none());
    }
}
