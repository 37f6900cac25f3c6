//! Built bundle output.

use crate::transform::ItemTransform;
use crate::vfs::VirtualFile;
use std::time::SystemTime;

/// One resolved constituent of a bundle.
#[derive(Debug, Clone)]
pub struct BundleFile {
    /// Path as included; differs from `file` after extension replacement.
    pub include_path: String,
    pub file: VirtualFile,
    pub transforms: Vec<ItemTransform>,
}

impl BundleFile {
    pub fn new(include_path: impl Into<String>, file: VirtualFile) -> Self {
        Self {
            include_path: include_path.into(),
            file,
            transforms: Vec::new(),
        }
    }

    pub fn with_transforms(mut self, transforms: Vec<ItemTransform>) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn virtual_path(&self) -> &str {
        &self.file.virtual_path
    }
}

/// Content plus metadata of one build. Immutable once cached.
#[derive(Debug, Clone)]
pub struct BundleResponse {
    pub content: String,
    pub files: Vec<BundleFile>,
    pub content_type: String,
    /// URL-safe token over the ordered files and their mtimes.
    pub version: String,
    /// Newest constituent mtime.
    pub last_modified: Option<SystemTime>,
}

impl BundleResponse {
    pub fn new(content: String, files: Vec<BundleFile>) -> Self {
        let version = crate::cache::compute_token(&files);
        let last_modified = files.iter().map(|f| f.file.modified).max();
        Self {
            content,
            files,
            content_type: String::new(),
            version,
            last_modified,
        }
    }

    /// Virtual paths of the constituent files, in order.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(BundleFile::virtual_path)
    }
}
