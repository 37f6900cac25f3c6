//! Virtual file system capability.
//!
//! The bundling engine never touches the disk directly. It asks a
//! [`VirtualPathProvider`] whether files and directories exist, reads file
//! bytes, and lists directories. Every file carries a modification time that
//! feeds version tokens and cache invalidation.
//!
//! # Implementations
//!
//! | Provider               | Backing store                     |
//! |------------------------|-----------------------------------|
//! | [`PhysicalFileProvider`] | a directory on disk mapped to `~/` |
//! | [`MemoryFileProvider`]   | an in-memory map (tests, injected content) |

mod memory;
mod physical;

pub use memory::MemoryFileProvider;
pub use physical::PhysicalFileProvider;

use std::io;
use std::time::SystemTime;

/// A resolved file: its virtual path and last-modified signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualFile {
    pub virtual_path: String,
    pub modified: SystemTime,
}

impl VirtualFile {
    pub fn new(virtual_path: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            virtual_path: virtual_path.into(),
            modified,
        }
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        crate::vpath::file_name(&self.virtual_path)
    }
}

/// Immediate children of a directory, each sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub files: Vec<VirtualFile>,
    /// Subdirectory virtual paths, each ending in `/`.
    pub directories: Vec<String>,
}

/// File system operations consumed by the bundling engine.
///
/// All paths are application-relative (`~/...`). Implementations must be
/// safe to call from many request threads at once.
pub trait VirtualPathProvider: Send + Sync {
    fn file_exists(&self, virtual_path: &str) -> bool;

    fn directory_exists(&self, virtual_path: &str) -> bool;

    /// Look up a file and its modification time.
    fn get_file(&self, virtual_path: &str) -> Option<VirtualFile>;

    /// Read the raw bytes of a file.
    fn read(&self, virtual_path: &str) -> io::Result<Vec<u8>>;

    /// List the immediate files and subdirectories of a directory.
    fn list_directory(&self, virtual_path: &str) -> io::Result<DirectoryListing>;
}

/// Read a file as text, dropping a leading byte-order mark.
pub fn read_to_string(
    provider: &dyn VirtualPathProvider,
    virtual_path: &str,
) -> io::Result<String> {
    let bytes = provider.read(virtual_path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}

/// Sort entries the way every provider reports them: by name, ignoring case.
pub(crate) fn sort_listing(listing: &mut DirectoryListing) {
    listing
        .files
        .sort_by_cached_key(|f| (f.name().to_lowercase(), f.name().to_string()));
    listing.directories.sort_by_cached_key(|d| d.to_lowercase());
}
