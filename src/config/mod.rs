//! Project configuration management for `sheaf.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── bundle     # [[bundle]], [[dynamic]]
//! │   ├── ignore     # [ignore]
//! │   ├── optimization
//! │   ├── serve      # [build], [serve]
//! │   └── site       # [site]
//! ├── types/         # ConfigError, diagnostics, field paths
//! └── mod.rs         # SheafConfig (this file)
//! ```
//!
//! Loading searches upward from the cwd for the config file. The directory
//! holding it becomes the project root; `site.root`, `site.manifest` and
//! `build.output` are resolved against it.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_path};

pub use section::{
    BuildSectionConfig, BundleConfig, BundleKindConfig, DirectoryConfig, DynamicConfig,
    IgnoreConfig, OptimizationConfig, ServeConfig, SiteSectionConfig,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{Cli, Commands};
use crate::collection::BundleCollection;
use crate::manifest::{BundleManifest, DEFAULT_MANIFEST_PATH};
use crate::vfs::PhysicalFileProvider;
use crate::{debug, log, vpath};
use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sheaf.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheafConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub optimization: OptimizationConfig,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub bundle: Vec<BundleConfig>,

    #[serde(default)]
    pub dynamic: Vec<DynamicConfig>,
}

impl SheafConfig {
    /// Load configuration for a CLI invocation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(
                "config file '{}' not found in this directory or any parent",
                cli.config.display()
            );
        };

        let mut config = Self::from_path(&config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;
        config.finalize(&root);
        config.apply_command_options(cli);
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        eprintln!();
        log!("warning"; "unknown fields in {}:", display_path);
        log!("warning"; "ignoring:");
        for field in fields {
            eprintln!("- {}", field);
        }
        eprintln!();
    }

    /// Resolve relative paths against the project root.
    fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        self.site.root = resolve_path(root, &self.site.root);
        self.site.manifest = self.site.manifest.take().map(|m| resolve_path(root, &m));
        self.build.output = resolve_path(root, &self.build.output);
        self.site.application_path = vpath::normalize_app_path(&self.site.application_path);
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Some(optimize) = cli.optimize() {
            self.optimization.enable = optimize;
        }
        match &cli.command {
            Commands::Build {
                output: Some(output),
                ..
            } => {
                self.build.output = resolve_path(&std::env::current_dir().unwrap_or_default(), output);
            }
            Commands::Serve {
                interface, port, ..
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
            _ => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // collection
    // ========================================================================

    /// Build the bundle collection this configuration describes.
    ///
    /// Every problem is collected and reported at once.
    pub fn build_collection(&self) -> Result<BundleCollection, ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if !self.site.root.is_dir() {
            diag.error_with_hint(
                FieldPath::new("site.root"),
                format!("directory `{}` does not exist", self.site.root.display()),
                "point `root` at the directory served as ~/",
            );
            return Err(ConfigError::Diagnostics(diag));
        }

        let provider = Arc::new(PhysicalFileProvider::new(&self.site.root));
        let mut collection = BundleCollection::new(provider.clone());
        collection.set_application_path(&self.site.application_path);
        collection.set_enable_optimizations(self.optimization.enable);
        collection.set_enable_instrumentation(self.optimization.instrumentation);
        collection.set_use_cdn(self.optimization.use_cdn);
        self.ignore.apply(collection.ignore_list_mut(), &mut diag);

        self.register_manifest(&mut collection, provider.as_ref())?;
        self.register_bundles(&mut collection, &mut diag);

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)?;
        debug!("config"; "{} bundles registered", collection.len());
        Ok(collection)
    }

    fn register_manifest(
        &self,
        collection: &mut BundleCollection,
        provider: &PhysicalFileProvider,
    ) -> Result<(), ConfigError> {
        let manifest = match &self.site.manifest {
            Some(path) => BundleManifest::read_file(path)
                .map(Some)
                .map_err(|e| ConfigError::Manifest(path.clone(), e))?,
            None => BundleManifest::read(provider, DEFAULT_MANIFEST_PATH).map_err(|e| {
                ConfigError::Manifest(self.site.root.join("bundle.config"), e)
            })?,
        };
        let Some(manifest) = manifest else {
            return Ok(());
        };

        let manifest_path = self
            .site
            .manifest
            .clone()
            .unwrap_or_else(|| self.site.root.join("bundle.config"));
        manifest
            .register(collection)
            .map_err(|e| ConfigError::Manifest(manifest_path, e.into()))?;
        debug!("config"; "loaded {} bundles from manifest", manifest.len());
        Ok(())
    }

    fn register_bundles(&self, collection: &mut BundleCollection, diag: &mut ConfigDiagnostics) {
        let mut seen = FxHashSet::default();
        for (i, entry) in self.bundle.iter().enumerate() {
            if !seen.insert(vpath::key(&entry.path)) {
                diag.warn(
                    FieldPath::indexed("bundle", i, "path"),
                    format!("`{}` is defined more than once; the last one wins", entry.path),
                );
            }
            if self.optimization.use_cdn
                && entry.cdn_fallback_expression.is_some()
                && entry.cdn_path.is_none()
            {
                diag.warn(
                    FieldPath::indexed("bundle", i, "cdn_fallback_expression"),
                    "set without `cdn_path`",
                );
            }
            match entry.to_bundle() {
                Ok(bundle) => {
                    collection.add(bundle);
                }
                Err(e) => diag.error(FieldPath::indexed("bundle", i, "path"), e.to_string()),
            }
        }

        for (i, entry) in self.dynamic.iter().enumerate() {
            match entry.to_bundle() {
                Ok(bundle) => {
                    collection.add(bundle);
                }
                Err(e) => diag.error(FieldPath::indexed("dynamic", i, "suffix"), e.to_string()),
            }
        }
    }

    /// Validate without keeping the collection.
    pub fn validate(&self) -> Result<()> {
        self.build_collection()
            .map(|_| ())
            .context("invalid configuration")
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SheafConfig {
    let (parsed, ignored) = SheafConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(config: &str, files: &[(&str, &str)]) -> (TempDir, SheafConfig) {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let mut parsed = test_parse_config(config);
        parsed.finalize(dir.path());
        (dir, parsed)
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SheafConfig::from_str("[site\nroot = \"x\"").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\nroot = \"www\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SheafConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.site.root, PathBuf::from("www"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_finalize_resolves_paths() {
        let (dir, config) = project("[site]\nroot = \"www\"\napplication_path = \"app\"", &[]);
        assert_eq!(config.site.root, dir.path().join("www"));
        assert_eq!(config.build.output, dir.path().join("dist"));
        assert_eq!(config.site.application_path, "/app/");
    }

    #[test]
    fn test_build_collection() {
        let (_dir, config) = project(
            r#"
[site]
root = "www"

[optimization]
enable = false

[[bundle]]
path = "~/bundles/site"
include = ["~/js/*.js"]

[[dynamic]]
suffix = "js"
pattern = "*.js"
"#,
            &[("www/js/a.js", "a"), ("www/js/b.js", "b")],
        );
        let collection = config.build_collection().unwrap();
        assert_eq!(collection.len(), 2);
        assert!(!collection.enable_optimizations());

        let response = collection
            .get_bundle_response("~/bundles/site")
            .unwrap()
            .unwrap();
        assert_eq!(response.content, "a\r\nb\r\n");

        let dynamic = collection.get_bundle_response("~/js/js").unwrap().unwrap();
        assert_eq!(dynamic.content, "a\r\nb\r\n");
    }

    #[test]
    fn test_build_collection_reports_every_error() {
        let (_dir, config) = project(
            r#"
[site]
root = "www"

[ignore]
always = ["**"]

[[bundle]]
path = "bundles/site"

[[dynamic]]
suffix = "/js"
pattern = "*.js"
"#,
            &[("www/js/a.js", "a")],
        );
        let Err(ConfigError::Diagnostics(diag)) = config.build_collection() else {
            panic!("expected diagnostics");
        };
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["ignore.always[0]", "bundle[0].path", "dynamic[0].suffix"]);
    }

    #[test]
    fn test_missing_site_root() {
        let (_dir, config) = project("[site]\nroot = \"nope\"", &[]);
        assert!(matches!(
            config.build_collection(),
            Err(ConfigError::Diagnostics(_))
        ));
    }

    #[test]
    fn test_default_manifest_is_loaded() {
        let (_dir, config) = project(
            "[site]\nroot = \"www\"",
            &[
                ("www/css/a.css", "a { color: red }"),
                (
                    "www/bundle.config",
                    r#"<bundles version="1.0"><styleBundle path="~/bundles/css"><include path="~/css/a.css" /></styleBundle></bundles>"#,
                ),
            ],
        );
        let collection = config.build_collection().unwrap();
        let css = collection
            .get_bundle_response("~/bundles/css")
            .unwrap()
            .unwrap();
        assert_eq!(css.content, "a{color:red}");
    }

    #[test]
    fn test_broken_manifest_is_an_error() {
        let (_dir, config) = project(
            "[site]\nroot = \"www\"\nmanifest = \"bundles.xml\"",
            &[("www/a.js", "a"), ("bundles.xml", "<bundles><oops /></bundles>")],
        );
        assert!(matches!(
            config.build_collection(),
            Err(ConfigError::Manifest(..))
        ));
    }
}
