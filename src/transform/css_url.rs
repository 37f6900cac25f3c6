//! Rebase relative `url(...)` references in stylesheets.
//!
//! Bundled CSS is served from the bundle URL, not from the stylesheet's own
//! directory, so `url(../img/bg.png)` in `~/content/themes/site.css` must
//! become `url(/content/img/bg.png)`.

use crate::bundle::BundleContext;
use crate::vpath;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(['"]?(?P<url>[^)]+?)['"]?\)"#).expect("static regex")
});

/// Item transform rewriting every non-`data:` url to an absolute path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CssRewriteUrlTransform;

impl CssRewriteUrlTransform {
    pub fn process(&self, ctx: &BundleContext<'_>, include_path: &str, input: String) -> String {
        let base = vpath::to_absolute(vpath::parent(include_path), ctx.application_path());
        rewrite_urls(&base, &input)
    }
}

/// Rewrite the urls of `css` relative to the absolute directory `base`.
pub fn rewrite_urls(base: &str, css: &str) -> String {
    URL_PATTERN
        .replace_all(css, |caps: &Captures<'_>| {
            let url = caps["url"].trim();
            if url.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:")) {
                caps[0].to_string()
            } else {
                format!("url({})", rebase_url(base, url))
            }
        })
        .into_owned()
}

/// Resolve `url` against the absolute directory `base`.
///
/// Blank inputs, root-relative urls and urls with a scheme are returned
/// unchanged. `.` and `..` segments are collapsed; a query or fragment is
/// kept as written.
pub fn rebase_url(base: &str, url: &str) -> String {
    if url.trim().is_empty() || base.trim().is_empty() || url.starts_with('/') || has_scheme(url) {
        return url.to_string();
    }
    let split = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split);

    let joined = format!("{}{}", vpath::normalize_dir(base), path);
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/').skip(1) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}{}", segments.join("/"), suffix)
}

fn has_scheme(url: &str) -> bool {
    url.find(':').is_some_and(|colon| {
        url[..colon]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
