//! Sheaf - bundling and minification of web assets.
//!
//! A [`BundleCollection`] holds script, style and plain bundles addressed by
//! application-relative virtual paths (`~/bundles/site`). Each bundle lists
//! includes (literal files, wildcards, `{version}` patterns, directories);
//! building one resolves them through a [`VirtualPathProvider`], orders and
//! concatenates the files, runs the bundle transforms (JS/CSS minification)
//! and caches the result under a content-derived version token.
//!
//! ```ignore
//! let provider = Arc::new(PhysicalFileProvider::new("wwwroot"));
//! let mut collection = BundleCollection::new(provider);
//!
//! let mut bundle = Bundle::script("~/bundles/site")?;
//! bundle.include("~/js/*.js")?;
//! collection.add(bundle);
//!
//! let url = collection.resolve_bundle_url("~/bundles/site")?;
//! ```

pub mod bundle;
pub mod cache;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod filter;
pub mod items;
pub mod logger;
pub mod manifest;
pub mod order;
pub mod pattern;
pub mod render;
pub mod transform;
pub mod utils;
pub mod vfs;
pub mod vpath;

pub use bundle::{Bundle, BundleContext, BundleFile, BundleKind, BundleResponse, CacheLookup};
pub use collection::{BundleCollection, BundleResolver};
pub use error::{BundleError, Result};
pub use filter::{FileExtensionReplacementList, IgnoreList};
pub use manifest::BundleManifest;
pub use transform::{BundleTransform, ItemTransform};
pub use vfs::{MemoryFileProvider, PhysicalFileProvider, VirtualPathProvider};
