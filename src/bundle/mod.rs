//! Bundles and the build pipeline.
//!
//! # Pipeline
//!
//! ```text
//! get_bundle_response(ctx)
//!   ├─ cache lookup (Server | Disabled | Precomputed)
//!   ├─ enumerate_files
//!   │    expand items → ignore (directory scans) → version selection
//!   │    → extension replacement → order → drop duplicate paths
//!   ├─ item transforms + concatenation
//!   ├─ bundle transforms (DefaultTransform when none)
//!   └─ publish to cache
//! ```

mod content;
mod context;
mod response;

pub use content::{JS_CONCATENATION_TOKEN, NEWLINE, instrumentation_boundary};
pub use context::BundleContext;
pub use response::{BundleFile, BundleResponse};

use crate::cache::Dependencies;
use crate::collection::BundleCollection;
use crate::debug;
use crate::error::{BundleError, Result};
use crate::items::{BundleDirectoryItem, Candidate, ExpandOptions, ItemRegistry, expand};
use crate::order::{BundleOrderer, DefaultBundleOrderer};
use crate::pattern::{self, FileNamePattern};
use crate::transform::{BundleTransform, DefaultTransform, ItemTransform};
use crate::vfs::{VirtualFile, VirtualPathProvider};
use crate::vpath;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;

/// Folder-relative bundle served for any `~/<dir>/<suffix>` request.
#[derive(Debug, Clone)]
pub struct DynamicFolder {
    pub suffix: String,
    pub search_pattern: FileNamePattern,
    pub recursive: bool,
}

#[derive(Debug, Clone)]
pub enum BundleKind {
    Plain,
    Script,
    Style,
    DynamicFolder(DynamicFolder),
}

impl BundleKind {
    /// Type name reported in instrumented output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Plain => "Bundle",
            Self::Script => "ScriptBundle",
            Self::Style => "StyleBundle",
            Self::DynamicFolder(_) => "DynamicFolderBundle",
        }
    }
}

/// How a bundle finds a response before building one.
#[derive(Debug, Clone, Default)]
pub enum CacheLookup {
    /// Shared process cache, re-validated against file state.
    #[default]
    Server,
    /// Build on every request.
    Disabled,
    /// Serve a fixed response; resolution never runs.
    Precomputed(Arc<BundleResponse>),
}

/// A named, ordered set of assets served as one unit.
#[derive(Clone)]
pub struct Bundle {
    path: String,
    kind: BundleKind,
    items: ItemRegistry,
    transforms: Vec<BundleTransform>,
    orderer: Option<Arc<dyn BundleOrderer>>,
    concatenation_token: Option<String>,
    cdn_path: Option<String>,
    cdn_fallback_expression: Option<String>,
    enable_file_extension_replacements: bool,
    cache_lookup: CacheLookup,
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("items", &self.items)
            .field("transforms", &self.transforms)
            .field("custom_orderer", &self.orderer.is_some())
            .field("concatenation_token", &self.concatenation_token)
            .field("cdn_path", &self.cdn_path)
            .finish_non_exhaustive()
    }
}

impl Bundle {
    fn with_kind(path: &str, kind: BundleKind, transforms: Vec<BundleTransform>) -> Self {
        Self {
            path: path.to_string(),
            kind,
            items: ItemRegistry::new(),
            transforms,
            orderer: None,
            concatenation_token: None,
            cdn_path: None,
            cdn_fallback_expression: None,
            enable_file_extension_replacements: true,
            cache_lookup: CacheLookup::Server,
        }
    }

    /// A bundle without transforms; the content type is inferred.
    pub fn new(virtual_path: &str) -> Result<Self> {
        vpath::ensure_app_relative(virtual_path, "virtual_path")?;
        Ok(Self::with_kind(virtual_path, BundleKind::Plain, Vec::new()))
    }

    pub fn with_cdn(virtual_path: &str, cdn_path: &str) -> Result<Self> {
        let mut bundle = Self::new(virtual_path)?;
        bundle.set_cdn_path(cdn_path)?;
        Ok(bundle)
    }

    /// A JavaScript bundle minified with [`BundleTransform::JsMinify`].
    pub fn script(virtual_path: &str) -> Result<Self> {
        vpath::ensure_app_relative(virtual_path, "virtual_path")?;
        Ok(Self::with_kind(
            virtual_path,
            BundleKind::Script,
            vec![BundleTransform::JsMinify],
        ))
    }

    /// A stylesheet bundle minified with [`BundleTransform::CssMinify`].
    pub fn style(virtual_path: &str) -> Result<Self> {
        vpath::ensure_app_relative(virtual_path, "virtual_path")?;
        Ok(Self::with_kind(
            virtual_path,
            BundleKind::Style,
            vec![BundleTransform::CssMinify],
        ))
    }

    /// A bundle answering `~/<any dir>/<suffix>` with that directory's
    /// files matching `search_pattern`.
    pub fn dynamic_folder(suffix: &str, search_pattern: &str, recursive: bool) -> Result<Self> {
        if suffix.trim().is_empty() {
            return Err(BundleError::EmptyArgument { param: "path_suffix" });
        }
        if suffix.starts_with('/') || suffix.starts_with('~') || suffix.contains('?') {
            return Err(BundleError::InvalidSuffix(suffix.to_string()));
        }
        if pattern::is_pure_wildcard(search_pattern) {
            return Err(BundleError::PureWildcard {
                param: "search_pattern",
            });
        }
        let dynamic = DynamicFolder {
            suffix: suffix.to_string(),
            search_pattern: FileNamePattern::compile(search_pattern, "search_pattern")?,
            recursive,
        };
        Ok(Self::with_kind(
            suffix,
            BundleKind::DynamicFolder(dynamic),
            Vec::new(),
        ))
    }

    // ------------------------------------------------------------------------
    // setup
    // ------------------------------------------------------------------------

    pub fn include(&mut self, virtual_path: &str) -> Result<&mut Self> {
        self.items.include(virtual_path, Vec::new())?;
        Ok(self)
    }

    /// Include a path whose content passes through `transforms` first.
    pub fn include_with(
        &mut self,
        virtual_path: &str,
        transforms: Vec<ItemTransform>,
    ) -> Result<&mut Self> {
        self.items.include(virtual_path, transforms)?;
        Ok(self)
    }

    pub fn include_many(&mut self, virtual_paths: &[&str]) -> Result<&mut Self> {
        for path in virtual_paths {
            self.items.include(path, Vec::new())?;
        }
        Ok(self)
    }

    pub fn include_directory(
        &mut self,
        directory_virtual_path: &str,
        search_pattern: &str,
        recursive: bool,
    ) -> Result<&mut Self> {
        self.items
            .include_directory(directory_virtual_path, search_pattern, recursive, Vec::new())?;
        Ok(self)
    }

    pub fn add_transform(&mut self, transform: BundleTransform) -> &mut Self {
        self.transforms.push(transform);
        self
    }

    pub fn set_orderer(&mut self, orderer: impl BundleOrderer + 'static) -> &mut Self {
        self.orderer = Some(Arc::new(orderer));
        self
    }

    /// An empty token restores the default separator.
    pub fn set_concatenation_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.concatenation_token = Some(token.into()).filter(|t| !t.is_empty());
        self
    }

    pub fn set_cdn_path(&mut self, cdn_path: &str) -> Result<&mut Self> {
        if self.is_dynamic() {
            return Err(BundleError::CdnNotSupported);
        }
        self.cdn_path = Some(cdn_path.to_string()).filter(|p| !p.is_empty());
        Ok(self)
    }

    pub fn set_cdn_fallback_expression(&mut self, expression: &str) -> &mut Self {
        self.cdn_fallback_expression = Some(expression.to_string()).filter(|e| !e.is_empty());
        self
    }

    pub fn set_enable_file_extension_replacements(&mut self, enable: bool) -> &mut Self {
        self.enable_file_extension_replacements = enable;
        self
    }

    pub fn set_cache_lookup(&mut self, lookup: CacheLookup) -> &mut Self {
        self.cache_lookup = lookup;
        self
    }

    /// Resolve this bundle's files through `provider` instead of the
    /// collection's.
    pub fn set_provider(&mut self, provider: Arc<dyn VirtualPathProvider>) -> &mut Self {
        self.items.set_provider(provider);
        self
    }

    // ------------------------------------------------------------------------
    // accessors
    // ------------------------------------------------------------------------

    /// `~/`-rooted path, or the suffix of a dynamic folder bundle.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &BundleKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, BundleKind::DynamicFolder(_))
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn transforms(&self) -> &[BundleTransform] {
        &self.transforms
    }

    pub fn cdn_path(&self) -> Option<&str> {
        self.cdn_path.as_deref()
    }

    pub fn cdn_fallback_expression(&self) -> Option<&str> {
        self.cdn_fallback_expression.as_deref()
    }

    pub fn cache_lookup(&self) -> &CacheLookup {
        &self.cache_lookup
    }

    /// Whether a request path ends in this dynamic bundle's suffix.
    pub fn matches_dynamic(&self, virtual_path: &str) -> bool {
        match &self.kind {
            BundleKind::DynamicFolder(d) => {
                vpath::file_name(virtual_path).eq_ignore_ascii_case(&d.suffix)
            }
            _ => false,
        }
    }

    /// Separator placed after each file.
    pub fn effective_concatenation_token(&self) -> &str {
        if let Some(token) = &self.concatenation_token {
            return token;
        }
        if self
            .transforms
            .iter()
            .any(|t| matches!(t, BundleTransform::JsMinify))
        {
            JS_CONCATENATION_TOKEN
        } else {
            NEWLINE
        }
    }

    fn provider<'s>(&'s self, collection: &'s BundleCollection) -> &'s dyn VirtualPathProvider {
        match self.items.provider() {
            Some(provider) => provider.as_ref(),
            None => collection.provider(),
        }
    }

    // ------------------------------------------------------------------------
    // resolution
    // ------------------------------------------------------------------------

    /// Resolve the ordered, de-duplicated file list.
    pub fn enumerate_files(&self, ctx: &BundleContext<'_>) -> Result<Vec<BundleFile>> {
        self.enumerate(ctx, &mut Dependencies::default())
    }

    fn enumerate(&self, ctx: &BundleContext<'_>, deps: &mut Dependencies) -> Result<Vec<BundleFile>> {
        let provider = self.provider(ctx.collection);
        let options = ExpandOptions {
            provider,
            ignore_list: ctx.collection.ignore_list(),
            enable_optimizations: ctx.enable_optimizations,
        };

        let candidates = match &self.kind {
            BundleKind::DynamicFolder(dynamic) => {
                self.expand_dynamic(dynamic, ctx.bundle_virtual_path, &options, deps)?
            }
            _ => self.items.expand(&options, deps)?,
        };

        let mut files = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            files.push(self.resolve_candidate(ctx, provider, candidate, deps)?);
        }

        let files = match &self.orderer {
            Some(orderer) => orderer.order_files(ctx, files),
            None => DefaultBundleOrderer.order_files(ctx, files),
        };

        let mut seen = FxHashSet::default();
        Ok(files
            .into_iter()
            .filter(|f| seen.insert(vpath::key(f.virtual_path())))
            .collect())
    }

    fn expand_dynamic(
        &self,
        dynamic: &DynamicFolder,
        request_path: &str,
        options: &ExpandOptions<'_>,
        deps: &mut Dependencies,
    ) -> Result<Vec<Candidate>> {
        vpath::ensure_app_relative(request_path, "virtual_path")?;
        let dir = vpath::parent(request_path);
        if !options.provider.directory_exists(dir) {
            return Err(BundleError::DirectoryNotFound {
                path: dir.to_string(),
                param: "virtual_path",
            });
        }
        let item = BundleDirectoryItem {
            virtual_path: dir.to_string(),
            search_pattern: dynamic.search_pattern.clone(),
            recursive: dynamic.recursive,
            transforms: Vec::new(),
        };
        let mut out = Vec::new();
        expand::expand_directory(&item, dir, options, deps, &mut out)?;
        Ok(out)
    }

    /// Apply extension replacement and pin the candidate to a real file.
    fn resolve_candidate(
        &self,
        ctx: &BundleContext<'_>,
        provider: &dyn VirtualPathProvider,
        candidate: Candidate,
        deps: &mut Dependencies,
    ) -> Result<BundleFile> {
        let Candidate {
            include_path,
            transforms,
            file,
        } = candidate;
        let nominal = file
            .as_ref()
            .map_or(include_path.as_str(), |f| f.virtual_path.as_str());

        let mut probe = |path: &str| -> Option<VirtualFile> {
            let found = provider.get_file(path);
            deps.record_file(path, found.as_ref().map(|f| f.modified));
            found
        };

        let mut replacement = None;
        if self.enable_file_extension_replacements {
            ctx.collection.file_extension_replacements().replacement_for(
                nominal,
                ctx.enable_optimizations,
                |path| {
                    replacement = probe(path);
                    replacement.is_some()
                },
            );
        }

        let resolved = match (replacement, file) {
            (Some(found), _) => found,
            (None, Some(listed)) => listed,
            (None, None) => probe(&include_path)
                .ok_or_else(|| BundleError::FileNotFound(include_path.clone()))?,
        };
        Ok(BundleFile::new(include_path, resolved).with_transforms(transforms))
    }

    // ------------------------------------------------------------------------
    // building
    // ------------------------------------------------------------------------

    /// Concatenate `files` and run the bundle transforms.
    pub fn build_response(
        &self,
        ctx: &BundleContext<'_>,
        files: Vec<BundleFile>,
    ) -> Result<BundleResponse> {
        let provider = self.provider(ctx.collection);
        let first_transform = self
            .transforms
            .first()
            .map_or("DefaultTransform", BundleTransform::name);
        let instrumentation = ctx
            .enable_instrumentation
            .then_some((self.type_name(), first_transform));

        let content = content::build_content(
            ctx,
            provider,
            &files,
            self.effective_concatenation_token(),
            instrumentation,
        )?;

        let mut response = BundleResponse::new(content, files);
        if self.transforms.is_empty() {
            DefaultTransform::new().process(&mut response);
        } else {
            for transform in &self.transforms {
                transform.process(ctx, &mut response);
            }
        }
        Ok(response)
    }

    /// Serve from cache or build, then publish.
    pub fn get_bundle_response(&self, ctx: &BundleContext<'_>) -> Result<Arc<BundleResponse>> {
        let use_cache = match &self.cache_lookup {
            CacheLookup::Precomputed(response) => return Ok(Arc::clone(response)),
            CacheLookup::Server => true,
            CacheLookup::Disabled => false,
        };

        let provider = self.provider(ctx.collection);
        let key = ctx.cache_key();
        if use_cache && let Some(hit) = ctx.collection.cache().get(&key, provider) {
            return Ok(hit);
        }

        let mut deps = Dependencies::default();
        let files = self.enumerate(ctx, &mut deps)?;
        let response = Arc::new(self.build_response(ctx, files)?);
        debug!(
            "bundle";
            "built {} ({} files, v={})",
            ctx.bundle_virtual_path,
            response.files.len(),
            response.version
        );

        if use_cache {
            ctx.collection
                .cache()
                .insert(key, Arc::clone(&response), deps);
        }
        Ok(response)
    }
}
