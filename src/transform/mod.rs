//! Content transforms.
//!
//! Two stages, both fixed when a bundle is built:
//!
//! - [`ItemTransform`]: rewrites one file's text before concatenation
//! - [`BundleTransform`]: rewrites the concatenated [`BundleResponse`]
//!
//! Built-in variants cover minification, content-type inference and CSS url
//! rebasing. `Custom` variants accept any implementation of the matching
//! trait.

mod content_type;
mod css_url;
pub mod minify;

pub use content_type::{CSS_CONTENT_TYPE, DefaultTransform, JS_CONTENT_TYPE};
pub use css_url::{CssRewriteUrlTransform, rebase_url};

use crate::bundle::{BundleContext, BundleResponse};
use std::fmt;
use std::sync::Arc;

/// A user-supplied bundle-level transform.
pub trait BundleTransformer: Send + Sync {
    /// Type name reported in instrumented output.
    fn name(&self) -> &str;

    fn process(&self, ctx: &BundleContext<'_>, response: &mut BundleResponse);
}

/// A user-supplied per-file transform.
pub trait ItemTransformer: Send + Sync {
    fn process(&self, ctx: &BundleContext<'_>, include_path: &str, input: String) -> String;
}

/// Stage applied to the concatenated bundle.
#[derive(Clone)]
pub enum BundleTransform {
    JsMinify,
    CssMinify,
    Default(DefaultTransform),
    Custom(Arc<dyn BundleTransformer>),
}

impl BundleTransform {
    pub fn custom(transformer: impl BundleTransformer + 'static) -> Self {
        Self::Custom(Arc::new(transformer))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::JsMinify => "JsMinify",
            Self::CssMinify => "CssMinify",
            Self::Default(_) => "DefaultTransform",
            Self::Custom(t) => t.name(),
        }
    }

    pub fn process(&self, ctx: &BundleContext<'_>, response: &mut BundleResponse) {
        match self {
            Self::JsMinify => minify::process_js(ctx, response),
            Self::CssMinify => minify::process_css(ctx, response),
            Self::Default(t) => t.process(response),
            Self::Custom(t) => t.process(ctx, response),
        }
    }
}

impl fmt::Debug for BundleTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(t) => f.debug_tuple("Default").field(t).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Stage applied to each file before concatenation.
#[derive(Clone)]
pub enum ItemTransform {
    CssRewriteUrl(CssRewriteUrlTransform),
    Custom(Arc<dyn ItemTransformer>),
}

impl ItemTransform {
    pub fn custom(transformer: impl ItemTransformer + 'static) -> Self {
        Self::Custom(Arc::new(transformer))
    }

    pub fn process(&self, ctx: &BundleContext<'_>, include_path: &str, input: String) -> String {
        match self {
            Self::CssRewriteUrl(t) => t.process(ctx, include_path, input),
            Self::Custom(t) => t.process(ctx, include_path, input),
        }
    }
}

impl fmt::Debug for ItemTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CssRewriteUrl(_) => f.write_str("CssRewriteUrl"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}
