//! Lenient, view-facing queries over a collection.

use super::BundleCollection;
use crate::vpath;

/// Query helper for templates and tooling. Never errors: unknown or
/// malformed input yields `false`/`None`.
#[derive(Debug, Clone, Copy)]
pub struct BundleResolver<'a> {
    collection: &'a BundleCollection,
}

impl<'a> BundleResolver<'a> {
    pub fn new(collection: &'a BundleCollection) -> Self {
        Self { collection }
    }

    pub fn is_bundle_virtual_path(&self, virtual_path: &str) -> bool {
        vpath::is_app_relative(virtual_path)
            && matches!(self.collection.get_bundle_for(virtual_path), Ok(Some(_)))
    }

    /// Resolved file paths of a bundle, in bundle order.
    pub fn get_bundle_contents(&self, virtual_path: &str) -> Option<Vec<String>> {
        if !vpath::is_app_relative(virtual_path) {
            return None;
        }
        let bundle = self.collection.get_bundle_for(virtual_path).ok()??;
        let files = bundle
            .enumerate_files(&self.collection.context(virtual_path))
            .ok()?;
        Some(files.iter().map(|f| f.virtual_path().to_string()).collect())
    }

    pub fn get_bundle_url(&self, virtual_path: &str) -> Option<String> {
        if !self.is_bundle_virtual_path(virtual_path) {
            return None;
        }
        self.collection.resolve_bundle_url(virtual_path).ok()
    }
}
