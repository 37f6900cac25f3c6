//! Version tokens for cache busting.
//!
//! The token is a blake3 digest of the ordered `(virtual path, mtime)` pairs
//! of a bundle's resolved files, base64url-encoded without padding. Two
//! bundles resolving to the same files share a token.

use crate::bundle::BundleFile;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::time::SystemTime;

/// Compute the token for an ordered file list.
pub fn compute_token(files: &[BundleFile]) -> String {
    let mut hasher = blake3::Hasher::new();
    for file in files {
        hasher.update(file.file.virtual_path.to_lowercase().as_bytes());
        hasher.update(&[0]);
        hasher.update(&mtime_nanos(file.file.modified).to_le_bytes());
    }
    URL_SAFE_NO_PAD.encode(hasher.finalize().as_bytes())
}

fn mtime_nanos(time: SystemTime) -> u128 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

/// Append `v=<token>` to a URL.
///
/// Returns `url?v=abc` or, when a query is present, `url?x=1&v=abc`.
pub fn versioned_url(url: &str, token: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}v={token}")
}

/// Extract the `v` parameter from a query string.
pub fn token_from_query(query: &str) -> Option<&str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "v")
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::VirtualFile;
    use std::time::Duration;

    fn file(path: &str, secs: u64) -> BundleFile {
        BundleFile::new(
            path,
            VirtualFile::new(path, SystemTime::UNIX_EPOCH + Duration::from_secs(secs)),
        )
    }

    #[test]
    fn test_token_is_deterministic_and_url_safe() {
        let files = [file("~/a.js", 1), file("~/b.js", 2)];
        let token = compute_token(&files);
        assert_eq!(token, compute_token(&files));
        assert_eq!(token.len(), 43);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_token_changes_with_input() {
        let base = compute_token(&[file("~/a.js", 1), file("~/b.js", 2)]);
        assert_ne!(base, compute_token(&[file("~/a.js", 1), file("~/b.js", 3)]));
        assert_ne!(base, compute_token(&[file("~/b.js", 2), file("~/a.js", 1)]));
        assert_ne!(base, compute_token(&[file("~/a.js", 1)]));
        assert_ne!(
            base,
            compute_token(&[file("~/a.js", 1), file("~/b.js", 2), file("~/c.js", 3)])
        );
    }

    #[test]
    fn test_versioned_url() {
        assert_eq!(versioned_url("/bundles/site", "abc"), "/bundles/site?v=abc");
        assert_eq!(versioned_url("/bundles/site?x=1", "abc"), "/bundles/site?x=1&v=abc");
    }

    #[test]
    fn test_token_from_query() {
        assert_eq!(token_from_query("v=abc"), Some("abc"));
        assert_eq!(token_from_query("x=1&v=abc"), Some("abc"));
        assert_eq!(token_from_query("x=1"), None);
    }
}
