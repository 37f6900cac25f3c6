//! Process-wide build cache.
//!
//! Entries are keyed by `{bundle path, optimizations, instrumentation}` and
//! carry the [`Dependencies`] observed while building. Every lookup
//! re-validates those dependencies, so an edited file is picked up on the
//! next request without a restart.
//!
//! Entries are published as whole `Arc`s into a `DashMap`: concurrent
//! builders of the same key race, the last insert wins, and readers only ever
//! see complete responses.

mod dependency;
pub mod version;

pub use dependency::{Dependencies, fingerprint};
pub use version::{compute_token, versioned_url};

use crate::bundle::BundleResponse;
use crate::vfs::VirtualPathProvider;
use crate::vpath;
use dashmap::DashMap;
use std::sync::Arc;

/// Identifies one build configuration of one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased request path (dynamic bundles cache per directory).
    pub path: String,
    pub enable_optimizations: bool,
    pub enable_instrumentation: bool,
}

impl CacheKey {
    pub fn new(path: &str, enable_optimizations: bool, enable_instrumentation: bool) -> Self {
        Self {
            path: vpath::key(path),
            enable_optimizations,
            enable_instrumentation,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    response: Arc<BundleResponse>,
    dependencies: Dependencies,
}

#[derive(Debug, Default)]
pub struct BundleCache {
    entries: DashMap<CacheKey, Arc<CacheEntry>>,
}

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a still-valid response. Stale entries are evicted.
    pub fn get(
        &self,
        key: &CacheKey,
        provider: &dyn VirtualPathProvider,
    ) -> Option<Arc<BundleResponse>> {
        // Clone out of the shard so validation runs without holding its lock.
        let entry = self.entries.get(key).map(|e| Arc::clone(&e))?;
        if entry.dependencies.is_current(provider) {
            return Some(Arc::clone(&entry.response));
        }
        self.entries
            .remove_if(key, |_, current| Arc::ptr_eq(current, &entry));
        None
    }

    pub fn insert(
        &self,
        key: CacheKey,
        response: Arc<BundleResponse>,
        dependencies: Dependencies,
    ) {
        self.entries.insert(
            key,
            Arc::new(CacheEntry {
                response,
                dependencies,
            }),
        );
    }

    /// Drop every entry built for `path` (any mode).
    pub fn invalidate(&self, path: &str) {
        let path = vpath::key(path);
        self.entries.retain(|key, _| key.path != path);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
