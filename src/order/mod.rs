//! File ordering strategies.
//!
//! The orderer runs after expansion and replacement and before duplicate
//! elimination, so every strategy must sort stably: the first occurrence of
//! a path is the one that survives.

mod fileset;

pub use fileset::{BundleFileSetOrdering, default_orderings, rank};

use crate::bundle::{BundleContext, BundleFile};
use std::cmp::Ordering;
use std::sync::Arc;

/// Orders the resolved files of a bundle.
pub trait BundleOrderer: Send + Sync {
    fn order_files(&self, ctx: &BundleContext<'_>, files: Vec<BundleFile>) -> Vec<BundleFile>;
}

/// Recognized libraries first, by group then member; everything else keeps
/// its discovery order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBundleOrderer;

impl BundleOrderer for DefaultBundleOrderer {
    fn order_files(&self, ctx: &BundleContext<'_>, mut files: Vec<BundleFile>) -> Vec<BundleFile> {
        let orderings = ctx.collection.file_set_orderings();
        if orderings.is_empty() {
            return files;
        }
        files.sort_by_cached_key(|f| rank(orderings, f.file.name()));
        files
    }
}

/// Keeps files exactly as resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitOrderer;

impl BundleOrderer for ExplicitOrderer {
    fn order_files(&self, _ctx: &BundleContext<'_>, files: Vec<BundleFile>) -> Vec<BundleFile> {
        files
    }
}

type Comparer = dyn Fn(&BundleFile, &BundleFile) -> Ordering + Send + Sync;

/// Stable sort with a caller-supplied comparison.
#[derive(Clone)]
pub struct ComparerOrderer {
    compare: Arc<Comparer>,
}

impl ComparerOrderer {
    pub fn new(
        compare: impl Fn(&BundleFile, &BundleFile) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// Order by virtual path, ignoring case.
    pub fn by_path() -> Self {
        Self::new(|a, b| {
            a.file
                .virtual_path
                .to_lowercase()
                .cmp(&b.file.virtual_path.to_lowercase())
        })
    }
}

impl BundleOrderer for ComparerOrderer {
    fn order_files(&self, _ctx: &BundleContext<'_>, mut files: Vec<BundleFile>) -> Vec<BundleFile> {
        files.sort_by(|a, b| (self.compare)(a, b));
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::BundleCollection;
    use crate::vfs::{MemoryFileProvider, VirtualFile};
    use std::time::SystemTime;

    fn files(paths: &[&str]) -> Vec<BundleFile> {
        paths
            .iter()
            .map(|p| BundleFile::new(*p, VirtualFile::new(*p, SystemTime::UNIX_EPOCH)))
            .collect()
    }

    fn names(files: &[BundleFile]) -> Vec<&str> {
        files.iter().map(|f| f.file.name()).collect()
    }

    fn collection() -> BundleCollection {
        BundleCollection::new(Arc::new(MemoryFileProvider::new()))
    }

    #[test]
    fn test_default_orderer_puts_libraries_first() {
        let collection = collection();
        let ctx = collection.context("~/b");
        let input = files(&[
            "~/s/site.js",
            "~/s/jquery.validate.js",
            "~/s/app.js",
            "~/s/modernizr-2.5.js",
            "~/s/jquery-1.7.1.js",
            "~/c/reset.css",
        ]);
        let ordered = DefaultBundleOrderer.order_files(&ctx, input);
        assert_eq!(
            names(&ordered),
            [
                "reset.css",
                "jquery-1.7.1.js",
                "jquery.validate.js",
                "modernizr-2.5.js",
                "site.js",
                "app.js"
            ]
        );
    }

    #[test]
    fn test_default_orderer_is_stable_for_duplicates() {
        let collection = collection();
        let ctx = collection.context("~/b");
        let mut input = files(&["~/a/jquery.js", "~/x.js", "~/b/jquery.js"]);
        input[0].include_path = "first".into();
        let ordered = DefaultBundleOrderer.order_files(&ctx, input);
        assert_eq!(ordered[0].include_path, "first");
        assert_eq!(ordered[1].file.virtual_path, "~/b/jquery.js");
        assert_eq!(ordered[2].file.virtual_path, "~/x.js");
    }

    #[test]
    fn test_empty_orderings_keep_input() {
        let mut collection = collection();
        collection.file_set_orderings_mut().clear();
        let ctx = collection.context("~/b");
        let ordered = DefaultBundleOrderer.order_files(&ctx, files(&["~/z.js", "~/jquery.js"]));
        assert_eq!(names(&ordered), ["z.js", "jquery.js"]);
    }

    #[test]
    fn test_explicit_and_comparer() {
        let collection = collection();
        let ctx = collection.context("~/b");
        let input = files(&["~/c.js", "~/A.js", "~/b.js"]);
        assert_eq!(
            names(&ExplicitOrderer.order_files(&ctx, input.clone())),
            ["c.js", "A.js", "b.js"]
        );
        assert_eq!(
            names(&ComparerOrderer::by_path().order_files(&ctx, input)),
            ["A.js", "b.js", "c.js"]
        );
    }
}
