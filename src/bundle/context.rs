//! Per-request build context.

use crate::cache::CacheKey;
use crate::collection::BundleCollection;

/// Everything a build needs beyond the bundle itself.
///
/// Created per request from the collection's current flags; the flags may
/// be overridden for one request without touching the collection.
#[derive(Clone, Copy)]
pub struct BundleContext<'a> {
    pub collection: &'a BundleCollection,
    /// The requested path. For dynamic folder bundles this names the folder.
    pub bundle_virtual_path: &'a str,
    pub enable_optimizations: bool,
    pub enable_instrumentation: bool,
}

impl<'a> BundleContext<'a> {
    pub fn new(collection: &'a BundleCollection, bundle_virtual_path: &'a str) -> Self {
        Self {
            collection,
            bundle_virtual_path,
            enable_optimizations: collection.enable_optimizations(),
            enable_instrumentation: collection.enable_instrumentation(),
        }
    }

    pub fn with_optimizations(mut self, enable: bool) -> Self {
        self.enable_optimizations = enable;
        self
    }

    pub fn with_instrumentation(mut self, enable: bool) -> Self {
        self.enable_instrumentation = enable;
        self
    }

    pub fn application_path(&self) -> &str {
        self.collection.application_path()
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(
            self.bundle_virtual_path,
            self.enable_optimizations,
            self.enable_instrumentation,
        )
    }
}
