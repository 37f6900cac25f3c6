//! The bundle table and its shared settings.
//!
//! A [`BundleCollection`] is built once (from code, `sheaf.toml` or a
//! manifest) and then shared read-only, typically behind an `Arc`. Only the
//! embedded build cache mutates after setup.

mod resolver;

pub use resolver::BundleResolver;

use crate::bundle::{Bundle, BundleContext, BundleResponse};
use crate::cache::{self, BundleCache};
use crate::error::Result;
use crate::filter::{FileExtensionReplacementList, IgnoreList};
use crate::order::{self, BundleFileSetOrdering};
use crate::vfs::VirtualPathProvider;
use crate::vpath;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

pub struct BundleCollection {
    bundles: Vec<Arc<Bundle>>,
    /// Lowercased path → index into `bundles`.
    index: FxHashMap<String, usize>,
    dynamic: Vec<Arc<Bundle>>,
    provider: Arc<dyn VirtualPathProvider>,
    ignore_list: IgnoreList,
    replacements: FileExtensionReplacementList,
    orderings: Vec<BundleFileSetOrdering>,
    application_path: String,
    use_cdn: bool,
    enable_optimizations: bool,
    enable_instrumentation: bool,
    cache: BundleCache,
}

impl fmt::Debug for BundleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleCollection")
            .field("bundles", &self.bundles.len())
            .field("dynamic", &self.dynamic.len())
            .field("application_path", &self.application_path)
            .field("use_cdn", &self.use_cdn)
            .field("enable_optimizations", &self.enable_optimizations)
            .field("enable_instrumentation", &self.enable_instrumentation)
            .finish_non_exhaustive()
    }
}

impl BundleCollection {
    /// An empty collection seeded with the default ignore, replacement and
    /// ordering lists. Optimizations start enabled.
    pub fn new(provider: Arc<dyn VirtualPathProvider>) -> Self {
        Self {
            bundles: Vec::new(),
            index: FxHashMap::default(),
            dynamic: Vec::new(),
            provider,
            ignore_list: IgnoreList::with_defaults(),
            replacements: FileExtensionReplacementList::with_defaults(),
            orderings: order::default_orderings(),
            application_path: "/".to_string(),
            use_cdn: false,
            enable_optimizations: true,
            enable_instrumentation: false,
            cache: BundleCache::new(),
        }
    }

    // ------------------------------------------------------------------------
    // registration
    // ------------------------------------------------------------------------

    /// Register `bundle`, replacing any bundle with the same path in place.
    pub fn add(&mut self, bundle: Bundle) -> Arc<Bundle> {
        let bundle = Arc::new(bundle);
        if bundle.is_dynamic() {
            let suffix = bundle.path();
            match self
                .dynamic
                .iter()
                .position(|b| b.path().eq_ignore_ascii_case(suffix))
            {
                Some(i) => self.dynamic[i] = Arc::clone(&bundle),
                None => self.dynamic.push(Arc::clone(&bundle)),
            }
            // Cached per requested directory, so any entry may belong to it.
            self.cache.clear();
            return bundle;
        }

        let key = vpath::key(bundle.path());
        match self.index.get(&key) {
            Some(&i) => self.bundles[i] = Arc::clone(&bundle),
            None => {
                self.index.insert(key, self.bundles.len());
                self.bundles.push(Arc::clone(&bundle));
            }
        }
        self.cache.invalidate(bundle.path());
        bundle
    }

    /// Unregister the bundle at `path` (or the dynamic bundle with that
    /// suffix).
    pub fn remove(&mut self, path: &str) -> bool {
        let key = vpath::key(path);
        if let Some(i) = self.index.remove(&key) {
            self.bundles.remove(i);
            self.reindex();
            self.cache.invalidate(path);
            return true;
        }
        let before = self.dynamic.len();
        self.dynamic.retain(|b| !b.path().eq_ignore_ascii_case(path));
        if self.dynamic.len() != before {
            self.cache.clear();
            return true;
        }
        false
    }

    fn reindex(&mut self) {
        self.index = self
            .bundles
            .iter()
            .enumerate()
            .map(|(i, b)| (vpath::key(b.path()), i))
            .collect();
    }

    /// Remove every bundle. Settings and lists are kept.
    pub fn clear(&mut self) {
        self.bundles.clear();
        self.index.clear();
        self.dynamic.clear();
        self.cache.clear();
    }

    /// Remove every bundle and empty the ignore, replacement and ordering
    /// lists, defaults included.
    pub fn reset_all(&mut self) {
        self.clear();
        self.ignore_list.clear();
        self.replacements.clear();
        self.orderings.clear();
    }

    pub fn len(&self) -> usize {
        self.bundles.len() + self.dynamic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Static bundles in registration order.
    pub fn bundles(&self) -> impl Iterator<Item = &Arc<Bundle>> {
        self.bundles.iter()
    }

    pub fn dynamic_bundles(&self) -> impl Iterator<Item = &Arc<Bundle>> {
        self.dynamic.iter()
    }

    /// Every registered bundle, static ones first.
    pub fn registered_bundles(&self) -> Vec<Arc<Bundle>> {
        self.bundles.iter().chain(&self.dynamic).cloned().collect()
    }

    // ------------------------------------------------------------------------
    // lookup
    // ------------------------------------------------------------------------

    /// Exact (case-insensitive) match first, then dynamic bundles by the
    /// last path segment.
    pub fn get_bundle_for(&self, virtual_path: &str) -> Result<Option<Arc<Bundle>>> {
        vpath::ensure_app_relative(virtual_path, "virtual_path")?;
        if let Some(&i) = self.index.get(&vpath::key(virtual_path)) {
            return Ok(Some(Arc::clone(&self.bundles[i])));
        }
        Ok(self
            .dynamic
            .iter()
            .find(|b| b.matches_dynamic(virtual_path))
            .cloned())
    }

    /// Build context for a request, carrying the collection's flags.
    pub fn context<'a>(&'a self, virtual_path: &'a str) -> BundleContext<'a> {
        BundleContext::new(self, virtual_path)
    }

    /// Response for the bundle at `virtual_path`, if one is registered.
    pub fn get_bundle_response(&self, virtual_path: &str) -> Result<Option<Arc<BundleResponse>>> {
        match self.get_bundle_for(virtual_path)? {
            Some(bundle) => bundle
                .get_bundle_response(&self.context(virtual_path))
                .map(Some),
            None => Ok(None),
        }
    }

    /// The URL a page should reference for `virtual_path`.
    ///
    /// Bundles get their CDN path (when enabled and set) or a version-stamped
    /// absolute URL. Anything else is resolved against the application path.
    pub fn resolve_bundle_url(&self, virtual_path: &str) -> Result<String> {
        vpath::ensure_app_relative(virtual_path, "virtual_path")?;
        let (base, _) = vpath::split_query(virtual_path);
        let url = vpath::to_absolute(virtual_path, &self.application_path);

        let Some(bundle) = self.get_bundle_for(base)? else {
            return Ok(url);
        };
        if self.use_cdn
            && let Some(cdn) = bundle.cdn_path()
        {
            return Ok(cdn.to_string());
        }
        let response = bundle.get_bundle_response(&self.context(base))?;
        Ok(cache::versioned_url(&url, &response.version))
    }

    pub fn resolver(&self) -> BundleResolver<'_> {
        BundleResolver::new(self)
    }

    // ------------------------------------------------------------------------
    // settings
    // ------------------------------------------------------------------------

    pub fn provider(&self) -> &dyn VirtualPathProvider {
        self.provider.as_ref()
    }

    pub fn set_provider(&mut self, provider: Arc<dyn VirtualPathProvider>) {
        self.provider = provider;
        self.cache.clear();
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    pub fn ignore_list(&self) -> &IgnoreList {
        &self.ignore_list
    }

    pub fn ignore_list_mut(&mut self) -> &mut IgnoreList {
        self.cache.clear();
        &mut self.ignore_list
    }

    pub fn file_extension_replacements(&self) -> &FileExtensionReplacementList {
        &self.replacements
    }

    pub fn file_extension_replacements_mut(&mut self) -> &mut FileExtensionReplacementList {
        self.cache.clear();
        &mut self.replacements
    }

    pub fn file_set_orderings(&self) -> &[BundleFileSetOrdering] {
        &self.orderings
    }

    pub fn file_set_orderings_mut(&mut self) -> &mut Vec<BundleFileSetOrdering> {
        self.cache.clear();
        &mut self.orderings
    }

    pub fn application_path(&self) -> &str {
        &self.application_path
    }

    /// Rebased CSS urls embed the application path, so cached responses go.
    pub fn set_application_path(&mut self, application_path: &str) {
        let normalized = vpath::normalize_app_path(application_path);
        if normalized != self.application_path {
            self.application_path = normalized;
            self.cache.clear();
        }
    }

    pub fn use_cdn(&self) -> bool {
        self.use_cdn
    }

    pub fn set_use_cdn(&mut self, use_cdn: bool) {
        self.use_cdn = use_cdn;
    }

    pub fn enable_optimizations(&self) -> bool {
        self.enable_optimizations
    }

    pub fn set_enable_optimizations(&mut self, enable: bool) {
        self.enable_optimizations = enable;
    }

    pub fn enable_instrumentation(&self) -> bool {
        self.enable_instrumentation
    }

    pub fn set_enable_instrumentation(&mut self, enable: bool) {
        self.enable_instrumentation = enable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BundleError;
    use crate::transform::{CssRewriteUrlTransform, ItemTransform};
    use crate::vfs::MemoryFileProvider;

    fn setup() -> (Arc<MemoryFileProvider>, BundleCollection) {
        let provider = Arc::new(MemoryFileProvider::new());
        provider.add_file("~/js/a.js", "var a;");
        provider.add_file("~/js/b.js", "var b;");
        provider.add_file("~/pages/x/one.js", "1");
        let collection = BundleCollection::new(provider.clone());
        (provider, collection)
    }

    fn plain(path: &str, include: &str) -> Bundle {
        let mut bundle = Bundle::new(path).unwrap();
        bundle.include(include).unwrap();
        bundle
    }

    #[test]
    fn test_add_replaces_in_place() {
        let (_, mut collection) = setup();
        collection.add(plain("~/first", "~/js/a.js"));
        collection.add(plain("~/Second", "~/js/a.js"));
        collection.add(plain("~/second", "~/js/b.js"));

        let paths: Vec<_> = collection.bundles().map(|b| b.path().to_string()).collect();
        assert_eq!(paths, ["~/first", "~/second"]);
        let second = collection.get_bundle_for("~/SECOND").unwrap().unwrap();
        assert_eq!(second.items().items()[0].virtual_path(), "~/js/b.js");
    }

    #[test]
    fn test_remove_clear_reset() {
        let (_, mut collection) = setup();
        collection.add(plain("~/a", "~/js/a.js"));
        collection.add(plain("~/b", "~/js/b.js"));
        collection.add(Bundle::dynamic_folder("js", "*.js", false).unwrap());
        assert_eq!(collection.len(), 3);

        assert!(collection.remove("~/A"));
        assert!(!collection.remove("~/a"));
        assert!(collection.get_bundle_for("~/b").unwrap().is_some());
        assert!(collection.remove("JS"));
        assert_eq!(collection.len(), 1);

        collection.clear();
        assert!(collection.is_empty());
        assert!(!collection.ignore_list().is_empty());

        collection.reset_all();
        assert!(collection.ignore_list().is_empty());
        assert!(collection.file_extension_replacements().is_empty());
        assert!(collection.file_set_orderings().is_empty());
    }

    #[test]
    fn test_get_bundle_for_requires_app_relative() {
        let (_, collection) = setup();
        assert!(matches!(
            collection.get_bundle_for("/js/a.js"),
            Err(BundleError::NotAppRelative { .. })
        ));
        assert!(collection.get_bundle_for("~/missing").unwrap().is_none());
    }

    #[test]
    fn test_dynamic_lookup_by_last_segment() {
        let (_, mut collection) = setup();
        collection.add(Bundle::dynamic_folder("js", "*.js", false).unwrap());
        let bundle = collection.get_bundle_for("~/pages/x/JS").unwrap().unwrap();
        assert!(bundle.is_dynamic());

        let response = collection
            .get_bundle_response("~/pages/x/js")
            .unwrap()
            .unwrap();
        assert_eq!(response.content, "1\r\n");
    }

    #[test]
    fn test_resolve_bundle_url_versions() {
        let (_, mut collection) = setup();
        collection.set_application_path("/app");
        collection.add(plain("~/bundles/site", "~/js/a.js"));

        let url = collection.resolve_bundle_url("~/bundles/site").unwrap();
        let token = collection
            .get_bundle_response("~/bundles/site")
            .unwrap()
            .unwrap()
            .version
            .clone();
        assert_eq!(url, format!("/app/bundles/site?v={token}"));

        let url = collection.resolve_bundle_url("~/bundles/site?x=1").unwrap();
        assert_eq!(url, format!("/app/bundles/site?x=1&v={token}"));

        assert_eq!(
            collection.resolve_bundle_url("~/js/a.js").unwrap(),
            "/app/js/a.js"
        );
        assert!(collection.resolve_bundle_url("js/a.js").is_err());
    }

    #[test]
    fn test_application_path_change_rebuilds_rebased_css() {
        let (provider, mut collection) = setup();
        provider.add_file("~/css/site.css", "a{background:url(img/x.png)}");
        let mut bundle = Bundle::new("~/bundles/css").unwrap();
        bundle
            .include_with(
                "~/css/site.css",
                vec![ItemTransform::CssRewriteUrl(CssRewriteUrlTransform)],
            )
            .unwrap();
        collection.add(bundle);

        let content = |collection: &BundleCollection| {
            collection
                .get_bundle_response("~/bundles/css")
                .unwrap()
                .unwrap()
                .content
                .clone()
        };
        assert_eq!(content(&collection), "a{background:url(/css/img/x.png)}\r\n");

        collection.set_application_path("/app");
        assert_eq!(
            content(&collection),
            "a{background:url(/app/css/img/x.png)}\r\n"
        );
    }

    #[test]
    fn test_resolve_bundle_url_cdn() {
        let (_, mut collection) = setup();
        let mut bundle = plain("~/bundles/jq", "~/js/a.js");
        bundle.set_cdn_path("https://cdn.example.com/jq.js").unwrap();
        collection.add(bundle);

        assert!(
            collection
                .resolve_bundle_url("~/bundles/jq")
                .unwrap()
                .starts_with("/bundles/jq?v=")
        );
        collection.set_use_cdn(true);
        assert_eq!(
            collection.resolve_bundle_url("~/bundles/jq").unwrap(),
            "https://cdn.example.com/jq.js"
        );
    }

    #[test]
    fn test_replacing_bundle_drops_cached_response() {
        let (_, mut collection) = setup();
        collection.add(plain("~/b", "~/js/a.js"));
        let first = collection.get_bundle_response("~/b").unwrap().unwrap();
        assert_eq!(first.content, "var a;\r\n");

        collection.add(plain("~/b", "~/js/b.js"));
        let second = collection.get_bundle_response("~/b").unwrap().unwrap();
        assert_eq!(second.content, "var b;\r\n");
    }

    #[test]
    fn test_collection_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BundleCollection>();
    }
}
