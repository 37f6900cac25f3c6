//! HTML tags referencing bundles and plain assets.
//!
//! With optimizations enabled a bundle renders as one tag pointing at its
//! version-stamped URL (or its CDN path, plus an optional local fallback for
//! scripts). With optimizations disabled it expands to one tag per
//! constituent file so the browser loads the sources unmodified.
//!
//! ```ignore
//! let html = render::scripts(&collection, &["~/bundles/jquery", "~/js/app.js"])?;
//! // <script src="https://cdn.example.com/jquery.js"></script>
//! // <script>(window.jQuery)||document.write('<script src="/bundles/jquery?v=..."><\/script>');</script>
//! // <script src="/js/app.js"></script>
//! ```

use crate::cache;
use crate::collection::BundleCollection;
use crate::error::{BundleError, Result};
use crate::vpath;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use rustc_hash::FxHashSet;

pub const SCRIPT_TAG_FORMAT: &str = r#"<script src="{0}"></script>"#;
pub const STYLE_TAG_FORMAT: &str = r#"<link href="{0}" rel="stylesheet"/>"#;

/// Placeholder replaced by the URL in a tag format.
const URL_PLACEHOLDER: &str = "{0}";

/// Characters escaped in rendered paths. `/` and `~` stay readable.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// `<script>` tags for `paths`, with CDN fallbacks.
pub fn scripts(collection: &BundleCollection, paths: &[&str]) -> Result<String> {
    render(collection, SCRIPT_TAG_FORMAT, paths, true)
}

/// `<link rel="stylesheet">` tags for `paths`.
pub fn styles(collection: &BundleCollection, paths: &[&str]) -> Result<String> {
    render(collection, STYLE_TAG_FORMAT, paths, false)
}

/// Render `paths` through a custom format, `{0}` standing for the URL.
pub fn render_format(
    collection: &BundleCollection,
    tag_format: &str,
    paths: &[&str],
) -> Result<String> {
    render(collection, tag_format, paths, false)
}

/// One resolved reference.
struct Asset {
    url: String,
    fallback: Option<(String, String)>,
}

fn render(
    collection: &BundleCollection,
    tag_format: &str,
    paths: &[&str],
    with_fallback: bool,
) -> Result<String> {
    if tag_format.trim().is_empty() {
        return Err(BundleError::EmptyArgument { param: "tag_format" });
    }
    if paths.iter().any(|p| p.trim().is_empty()) {
        return Err(BundleError::EmptyArgument { param: "paths" });
    }

    let assets = if collection.enable_optimizations() {
        resolve_optimized(collection, paths)?
    } else {
        resolve_debug(collection, paths)?
    };

    let mut out = String::new();
    for asset in assets {
        out.push_str(&tag_format.replace(URL_PLACEHOLDER, &asset.url));
        out.push('\n');
        if with_fallback && let Some((expression, local)) = asset.fallback {
            out.push_str(&format!(
                "<script>({expression})||document.write('<script src=\"{local}\"><\\/script>');</script>\n"
            ));
        }
    }
    Ok(out)
}

/// Bundles as single references; files a rendered bundle already carries
/// are skipped.
fn resolve_optimized(collection: &BundleCollection, paths: &[&str]) -> Result<Vec<Asset>> {
    let mut bundled = FxHashSet::default();
    let mut resolved = Vec::with_capacity(paths.len());

    for path in paths {
        let bundle = if vpath::is_app_relative(path) {
            collection.get_bundle_for(path)?
        } else {
            None
        };
        let Some(bundle) = bundle else {
            resolved.push((path, None));
            continue;
        };

        let response = bundle.get_bundle_response(&collection.context(path))?;
        bundled.extend(response.file_paths().map(vpath::key));

        let (base, _) = vpath::split_query(path);
        let local = cache::versioned_url(
            &vpath::to_absolute(base, collection.application_path()),
            &response.version,
        );
        let asset = match bundle.cdn_path().filter(|_| collection.use_cdn()) {
            Some(cdn) => Asset {
                url: cdn.to_string(),
                fallback: bundle
                    .cdn_fallback_expression()
                    .map(|expression| (expression.to_string(), local)),
            },
            None => Asset {
                url: local,
                fallback: None,
            },
        };
        resolved.push((path, Some(asset)));
    }

    let mut seen = FxHashSet::default();
    let mut assets = Vec::new();
    for (path, asset) in resolved {
        let asset = match asset {
            Some(asset) => asset,
            None if bundled.contains(&vpath::key(path)) => continue,
            None => plain_asset(collection, path),
        };
        if seen.insert(asset.url.clone()) {
            assets.push(asset);
        }
    }
    Ok(assets)
}

/// Bundles expanded to their files, in bundle order.
fn resolve_debug(collection: &BundleCollection, paths: &[&str]) -> Result<Vec<Asset>> {
    let mut seen = FxHashSet::default();
    let mut assets = Vec::new();

    for path in paths {
        let bundle = if vpath::is_app_relative(path) {
            collection.get_bundle_for(path)?
        } else {
            None
        };
        let expanded = match bundle {
            Some(bundle) => bundle
                .enumerate_files(&collection.context(path))?
                .iter()
                .map(|file| plain_asset(collection, file.virtual_path()))
                .collect(),
            None => vec![plain_asset(collection, path)],
        };
        for asset in expanded {
            if seen.insert(asset.url.clone()) {
                assets.push(asset);
            }
        }
    }
    Ok(assets)
}

/// App-relative paths are resolved and escaped; anything else is kept.
fn plain_asset(collection: &BundleCollection, path: &str) -> Asset {
    let url = if vpath::is_app_relative(path) {
        let (base, query) = vpath::split_query(path);
        let absolute = vpath::to_absolute(base, collection.application_path());
        let encoded = utf8_percent_encode(&absolute, PATH_ESCAPE).to_string();
        match query {
            Some(query) => format!("{encoded}?{query}"),
            None => encoded,
        }
    } else {
        path.to_string()
    };
    Asset {
        url,
        fallback: None,
    }
}
