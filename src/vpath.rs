//! Application-relative virtual paths (`~/dir/file.js`).
//!
//! All public entry points that accept a virtual path require the `~/`
//! root. Comparisons are case-insensitive.

use crate::error::{BundleError, Result};

/// Application root marker.
pub const ROOT: &str = "~/";

/// Check whether `path` is rooted at the application (`~` or `~/...`).
#[inline]
pub fn is_app_relative(path: &str) -> bool {
    path == "~" || path.starts_with(ROOT)
}

/// Reject empty and non-application-relative paths.
pub fn ensure_app_relative(path: &str, param: &'static str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(BundleError::EmptyArgument { param });
    }
    if !is_app_relative(path) {
        return Err(BundleError::NotAppRelative {
            path: path.to_string(),
            param,
        });
    }
    Ok(())
}

/// Normalized lookup key.
#[inline]
pub fn key(path: &str) -> String {
    path.to_lowercase()
}

/// Ensure a directory path ends in `/`.
pub fn normalize_dir(path: &str) -> String {
    if path == "~" {
        return ROOT.to_string();
    }
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Directory part of a path, including the trailing `/`.
///
/// `~/a/b.js` gives `~/a/`, `~/a/` gives `~/`.
pub fn parent(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) => &path[..=idx],
        None => ROOT,
    }
}

/// Last path segment.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Lowercased extension of the last segment, without the dot.
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    let idx = name.rfind('.')?;
    (idx + 1 < name.len()).then(|| name[idx + 1..].to_ascii_lowercase())
}

/// Join a directory and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    format!("{}{}", normalize_dir(dir), name.trim_start_matches('/'))
}

/// Split off a query string: `~/a?x=1` gives (`~/a`, Some(`x=1`)).
pub fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (path, None),
    }
}

/// Normalize an application base path to `/` or `/prefix/`.
pub fn normalize_app_path(app_path: &str) -> String {
    let trimmed = app_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Resolve `~/x` against the application base path.
///
/// Paths that are not application-relative are returned unchanged.
pub fn to_absolute(path: &str, app_path: &str) -> String {
    let app = normalize_app_path(app_path);
    if path == "~" {
        return app;
    }
    match path.strip_prefix(ROOT) {
        Some(rest) => format!("{app}{rest}"),
        None => path.to_string(),
    }
}

/// Map an absolute request path back to `~/x`.
///
/// Returns `None` when the path lies outside the application.
pub fn from_absolute(url_path: &str, app_path: &str) -> Option<String> {
    let app = normalize_app_path(app_path);
    let rest = url_path.strip_prefix(app.as_str()).or_else(|| {
        (url_path.len() + 1 == app.len() && app.starts_with(url_path)).then_some("")
    })?;
    Some(format!("{ROOT}{rest}"))
}
