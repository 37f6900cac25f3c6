//! Resolution-time expansion of items into candidate files.
//!
//! Expansion is stable: every candidate of item N precedes those of item
//! N+1. A directory yields its own files in listing order, then (when
//! recursive) each subdirectory depth-first.

use super::{BundleDirectoryItem, Item, ItemRegistry};
use crate::cache::Dependencies;
use crate::debug;
use crate::error::{BundleError, Result};
use crate::filter::IgnoreList;
use crate::pattern::PatternType;
use crate::transform::ItemTransform;
use crate::vfs::{VirtualFile, VirtualPathProvider};

/// Inputs shared by every item expansion in one build pass.
pub struct ExpandOptions<'a> {
    pub provider: &'a dyn VirtualPathProvider,
    pub ignore_list: &'a IgnoreList,
    pub enable_optimizations: bool,
}

/// A file selected by an item, before replacement and ordering.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Path as included (the literal path, or the listed file).
    pub include_path: String,
    pub transforms: Vec<ItemTransform>,
    /// Known for directory listings; literal paths resolve later.
    pub file: Option<VirtualFile>,
}

impl ItemRegistry {
    /// Expand every item into candidates, recording what was consulted.
    pub fn expand(
        &self,
        options: &ExpandOptions<'_>,
        deps: &mut Dependencies,
    ) -> Result<Vec<Candidate>> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                Item::File(file) => out.push(Candidate {
                    include_path: file.virtual_path.clone(),
                    transforms: file.transforms.clone(),
                    file: None,
                }),
                Item::Directory(dir) => {
                    if !options.provider.directory_exists(&dir.virtual_path) {
                        return Err(BundleError::DirectoryNotFound {
                            path: dir.virtual_path.clone(),
                            param: "directory_virtual_path",
                        });
                    }
                    expand_directory(dir, &dir.virtual_path, options, deps, &mut out)?;
                }
            }
        }
        Ok(out)
    }
}

/// Expand one directory item rooted at `path`.
pub(crate) fn expand_directory(
    item: &BundleDirectoryItem,
    path: &str,
    options: &ExpandOptions<'_>,
    deps: &mut Dependencies,
    out: &mut Vec<Candidate>,
) -> Result<()> {
    let listing = options
        .provider
        .list_directory(path)
        .map_err(|e| BundleError::io(path, e))?;
    deps.record_directory(path, &listing);

    let matched = listing.files.iter().filter(|f| {
        let name = f.name();
        item.search_pattern.is_match(name)
            && !options
                .ignore_list
                .should_ignore(options.enable_optimizations, name)
    });

    let selected: Vec<&VirtualFile> = if item.pattern_type() == PatternType::Version {
        highest_version(item, matched).into_iter().collect()
    } else {
        matched.collect()
    };

    out.extend(selected.into_iter().map(|file| Candidate {
        include_path: file.virtual_path.clone(),
        transforms: item.transforms.clone(),
        file: Some(file.clone()),
    }));

    if item.recursive {
        for sub in &listing.directories {
            expand_directory(item, sub, options, deps, out)?;
        }
    }
    Ok(())
}

/// Keep the single highest-versioned match; ties keep listing order.
fn highest_version<'a>(
    item: &BundleDirectoryItem,
    files: impl Iterator<Item = &'a VirtualFile>,
) -> Option<&'a VirtualFile> {
    let mut best: Option<(crate::pattern::Version, &VirtualFile)> = None;
    for file in files {
        let Some(version) = item.search_pattern.version_of(file.name()) else {
            debug!("expand"; "no comparable version in {}", file.virtual_path);
            continue;
        };
        if best.as_ref().is_none_or(|(v, _)| version > *v) {
            best = Some((version, file));
        }
    }
    best.map(|(_, file)| file)
}
