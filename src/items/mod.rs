//! Bundle items: the ordered list of things a bundle includes.
//!
//! ```text
//! include("~/a.js")           → BundleItem (literal)
//! include("~/lib/*.js")       → BundleDirectoryItem { dir: ~/lib/, pattern: *.js }
//! include("~/css/s{version}.css")
//!                             → BundleDirectoryItem { dir: ~/css/, pattern: s{version}.css }
//! include_directory("~/lib", "*.js", true)
//!                             → BundleDirectoryItem { recursive }
//! ```
//!
//! Directory items stay unresolved until a build asks for them (see [`expand`]).

pub(crate) mod expand;

pub use expand::{Candidate, ExpandOptions};

use crate::error::{BundleError, Result};
use crate::pattern::{self, FileNamePattern, PatternType};
use crate::transform::ItemTransform;
use crate::vfs::VirtualPathProvider;
use crate::vpath;
use std::fmt;
use std::sync::Arc;

/// A literal file reference.
#[derive(Debug, Clone)]
pub struct BundleItem {
    pub virtual_path: String,
    pub transforms: Vec<ItemTransform>,
}

/// An unresolved directory scan.
#[derive(Debug, Clone)]
pub struct BundleDirectoryItem {
    /// Always ends in `/`.
    pub virtual_path: String,
    pub search_pattern: FileNamePattern,
    pub recursive: bool,
    pub transforms: Vec<ItemTransform>,
}

impl BundleDirectoryItem {
    pub fn pattern_type(&self) -> PatternType {
        self.search_pattern.pattern_type()
    }
}

#[derive(Debug, Clone)]
pub enum Item {
    File(BundleItem),
    Directory(BundleDirectoryItem),
}

impl Item {
    pub fn virtual_path(&self) -> &str {
        match self {
            Self::File(item) => &item.virtual_path,
            Self::Directory(item) => &item.virtual_path,
        }
    }
}

/// Insertion-ordered items of one bundle.
///
/// An optional provider overrides the collection's for this bundle and
/// enables existence checks at registration time.
#[derive(Clone, Default)]
pub struct ItemRegistry {
    items: Vec<Item>,
    provider: Option<Arc<dyn VirtualPathProvider>>,
}

impl fmt::Debug for ItemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemRegistry")
            .field("items", &self.items)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Arc<dyn VirtualPathProvider>) -> Self {
        Self {
            items: Vec::new(),
            provider: Some(provider),
        }
    }

    pub fn provider(&self) -> Option<&Arc<dyn VirtualPathProvider>> {
        self.provider.as_ref()
    }

    pub fn set_provider(&mut self, provider: Arc<dyn VirtualPathProvider>) {
        self.provider = Some(provider);
    }

    /// Add a literal path or a last-segment pattern.
    ///
    /// Re-including a literal path (ignoring case) is a no-op.
    pub fn include(&mut self, virtual_path: &str, transforms: Vec<ItemTransform>) -> Result<()> {
        const PARAM: &str = "virtual_path";
        vpath::ensure_app_relative(virtual_path, PARAM)?;

        if virtual_path.ends_with('/') {
            return Err(BundleError::invalid_pattern(virtual_path, PARAM));
        }
        let name = vpath::file_name(virtual_path);
        let dir = vpath::parent(virtual_path);
        if dir.contains('*') {
            return Err(BundleError::invalid_pattern(virtual_path, PARAM));
        }

        if name.contains('*') || name.contains(pattern::VERSION_TOKEN) {
            if pattern::is_pure_wildcard(name) {
                return Err(BundleError::PureWildcard { param: PARAM });
            }
            let search_pattern = FileNamePattern::compile(name, PARAM)?;
            if let Some(provider) = &self.provider
                && !provider.directory_exists(dir)
            {
                return Err(BundleError::DirectoryNotFound {
                    path: dir.to_string(),
                    param: PARAM,
                });
            }
            self.items.push(Item::Directory(BundleDirectoryItem {
                virtual_path: dir.to_string(),
                search_pattern,
                recursive: false,
                transforms,
            }));
            return Ok(());
        }

        let duplicate = self.items.iter().any(|item| {
            matches!(item, Item::File(f) if f.virtual_path.eq_ignore_ascii_case(virtual_path))
        });
        if !duplicate {
            self.items.push(Item::File(BundleItem {
                virtual_path: virtual_path.to_string(),
                transforms,
            }));
        }
        Ok(())
    }

    /// Add a directory scan.
    ///
    /// With a provider attached the directory must already exist.
    pub fn include_directory(
        &mut self,
        directory_virtual_path: &str,
        search_pattern: &str,
        recursive: bool,
        transforms: Vec<ItemTransform>,
    ) -> Result<()> {
        vpath::ensure_app_relative(directory_virtual_path, "directory_virtual_path")?;
        if search_pattern.trim().is_empty() {
            return Err(BundleError::EmptyArgument {
                param: "search_pattern",
            });
        }
        if pattern::is_pure_wildcard(search_pattern) {
            return Err(BundleError::PureWildcard {
                param: "search_pattern",
            });
        }
        let search_pattern = FileNamePattern::compile(search_pattern, "search_pattern")?;

        let dir = vpath::normalize_dir(directory_virtual_path);
        if let Some(provider) = &self.provider
            && !provider.directory_exists(&dir)
        {
            return Err(BundleError::DirectoryNotFound {
                path: directory_virtual_path.to_string(),
                param: "directory_virtual_path",
            });
        }

        self.items.push(Item::Directory(BundleDirectoryItem {
            virtual_path: dir,
            search_pattern,
            recursive,
            transforms,
        }));
        Ok(())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
