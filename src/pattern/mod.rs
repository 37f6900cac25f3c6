//! Include and ignore pattern classification.
//!
//! | Pattern              | Type      | Matches                          |
//! |----------------------|-----------|----------------------------------|
//! | `*`                  | `All`     | every file (ignore lists only)   |
//! | `*.js`               | `Suffix`  | names ending in `.js`            |
//! | `jquery*`            | `Prefix`  | names starting with `jquery`     |
//! | `jquery-{version}.js`| `Version` | `jquery-1.7.1.js`, `jquery-2.0-beta.js` |
//! | `site.css`           | `Exact`   | `site.css`                       |
//!
//! All matching is case-insensitive.

mod version;

pub use version::Version;

use crate::error::{BundleError, Result};
use regex::Regex;

/// Placeholder expanded into a dotted version number.
pub const VERSION_TOKEN: &str = "{version}";

/// Two to four numeric groups, then an optional `-prerelease` tag.
const VERSION_REGEX: &str = r"(\d+(?:\s*\.\s*\d+){1,3})(-[a-z][0-9a-z-]*)?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    /// Bare `*`.
    All,
    /// Literal name, no wildcard.
    Exact,
    /// `prefix*`
    Prefix,
    /// `*suffix`
    Suffix,
    /// Contains `{version}`.
    Version,
}

/// Classify a single-segment pattern.
///
/// Classification never fails; pair with [`validate`] to reject malformed
/// wildcard placement.
pub fn classify(pattern: &str) -> PatternType {
    if pattern == "*" {
        PatternType::All
    } else if pattern.contains(VERSION_TOKEN) {
        PatternType::Version
    } else if pattern.starts_with('*') {
        PatternType::Suffix
    } else if pattern.ends_with('*') {
        PatternType::Prefix
    } else {
        PatternType::Exact
    }
}

/// Check wildcard placement for a classified pattern.
pub fn validate(pattern_type: PatternType, pattern: &str, param: &'static str) -> Result<()> {
    let stars = pattern.matches('*').count();
    let valid = match pattern_type {
        PatternType::All => true,
        PatternType::Exact | PatternType::Version => stars == 0,
        PatternType::Prefix | PatternType::Suffix => stars == 1,
    };
    if valid {
        Ok(())
    } else {
        Err(BundleError::invalid_pattern(pattern, param))
    }
}

/// `*` and `*.*` select an entire directory and are refused as search patterns.
pub fn is_pure_wildcard(pattern: &str) -> bool {
    matches!(pattern.trim(), "*" | "*.*")
}

/// Compile a `{version}` pattern into an anchored, case-insensitive regex.
///
/// Everything outside `{version}` is matched literally, including unknown
/// `{placeholders}`.
pub fn build_regex(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split(VERSION_TOKEN)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(VERSION_REGEX);
    Regex::new(&format!("(?i)^{body}$"))
        .map_err(|_| BundleError::invalid_pattern(pattern, "pattern"))
}

#[derive(Debug, Clone)]
enum Matcher {
    All,
    Exact(String),
    Prefix(String),
    Suffix(String),
    Version(Regex),
}

/// A validated, compiled file-name pattern.
#[derive(Debug, Clone)]
pub struct FileNamePattern {
    source: String,
    matcher: Matcher,
}

impl FileNamePattern {
    /// Classify, validate and compile `pattern`.
    pub fn compile(pattern: &str, param: &'static str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(BundleError::EmptyArgument { param });
        }
        let pattern_type = classify(pattern);
        validate(pattern_type, pattern, param)?;

        let lower = pattern.to_lowercase();
        let matcher = match pattern_type {
            PatternType::All => Matcher::All,
            PatternType::Exact => Matcher::Exact(lower),
            PatternType::Prefix => Matcher::Prefix(lower.trim_end_matches('*').to_string()),
            PatternType::Suffix => Matcher::Suffix(lower.trim_start_matches('*').to_string()),
            PatternType::Version => Matcher::Version(build_regex(pattern)?),
        };
        Ok(Self {
            source: pattern.to_string(),
            matcher,
        })
    }

    /// Compile a pattern from a built-in table.
    ///
    /// Built-in tables hold only literal and single-wildcard names, so no
    /// validation is needed.
    pub(crate) fn builtin(pattern: &str) -> Self {
        let lower = pattern.to_lowercase();
        let matcher = match classify(pattern) {
            PatternType::All => Matcher::All,
            PatternType::Prefix => Matcher::Prefix(lower.trim_end_matches('*').to_string()),
            PatternType::Suffix => Matcher::Suffix(lower.trim_start_matches('*').to_string()),
            PatternType::Exact | PatternType::Version => Matcher::Exact(lower),
        };
        Self {
            source: pattern.to_string(),
            matcher,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn pattern_type(&self) -> PatternType {
        match self.matcher {
            Matcher::All => PatternType::All,
            Matcher::Exact(_) => PatternType::Exact,
            Matcher::Prefix(_) => PatternType::Prefix,
            Matcher::Suffix(_) => PatternType::Suffix,
            Matcher::Version(_) => PatternType::Version,
        }
    }

    /// Test a bare file name (no directory part).
    pub fn is_match(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::All => true,
            Matcher::Version(re) => re.is_match(name),
            Matcher::Exact(p) => name.to_lowercase() == *p,
            Matcher::Prefix(p) => name.to_lowercase().starts_with(p.as_str()),
            Matcher::Suffix(p) => name.to_lowercase().ends_with(p.as_str()),
        }
    }

    /// Extract the first `{version}` value from a matching name.
    pub fn version_of(&self, name: &str) -> Option<Version> {
        let Matcher::Version(re) = &self.matcher else {
            return None;
        };
        let caps = re.captures(name)?;
        let number = caps.get(1)?.as_str();
        let pre = caps.get(2).map(|m| &m.as_str()[1..]);
        Version::parse(number, pre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("*"), PatternType::All);
        assert_eq!(classify("*.js"), PatternType::Suffix);
        assert_eq!(classify("jquery*"), PatternType::Prefix);
        assert_eq!(classify("jquery-{version}.js"), PatternType::Version);
        assert_eq!(classify("site.css"), PatternType::Exact);
    }

    #[test]
    fn test_validate_rejects_bad_wildcards() {
        for bad in ["a*b", "**a", "a**", "*{version}", "*a*"] {
            let err = validate(classify(bad), bad, "search_pattern").unwrap_err();
            assert!(
                err.to_string().contains(&format!("'{bad}'")),
                "pattern {bad} should be rejected"
            );
        }
        for good in ["*.js", "foo.*", "site.css", "x{version}.js", "*"] {
            assert!(validate(classify(good), good, "p").is_ok(), "{good}");
        }
    }

    #[test]
    fn test_pure_wildcard() {
        assert!(is_pure_wildcard("*"));
        assert!(is_pure_wildcard(" *.* "));
        assert!(!is_pure_wildcard("*.js"));
    }

    #[test]
    fn test_version_regex() {
        let re = build_regex("jquery-{version}.js").unwrap();
        assert!(re.is_match("jquery-1.7.1.js"));
        assert!(re.is_match("JQUERY-1.7.js"));
        assert!(re.is_match("jquery-1.7.1.2.js"));
        assert!(re.is_match("jquery-2.0-beta2.js"));
        assert!(re.is_match("jquery-1 . 7.js"));
        assert!(!re.is_match("jquery-1.js"));
        assert!(!re.is_match("jquery-1.2.3.4.5.js"));
        assert!(!re.is_match("jquery-1.7.1.min.js"));
        assert!(!re.is_match("jquery.js"));
    }

    #[test]
    fn test_version_regex_multiple_and_unknown_placeholders() {
        let re = build_regex("lib{version}-{name}-{version}.js").unwrap();
        assert!(re.is_match("lib1.0-{name}-2.0.js"));
        assert!(!re.is_match("lib1.0-x-2.0.js"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let suffix = FileNamePattern::compile("*.JS", "p").unwrap();
        assert!(suffix.is_match("app.js"));
        let prefix = FileNamePattern::compile("JQuery*", "p").unwrap();
        assert!(prefix.is_match("jquery-ui.js"));
        assert!(!prefix.is_match("xjquery.js"));
        let exact = FileNamePattern::compile("Reset.css", "p").unwrap();
        assert!(exact.is_match("reset.CSS"));
        assert!(!exact.is_match("reset.css.map"));
    }

    #[test]
    fn test_version_of() {
        let p = FileNamePattern::compile("style{version}.css", "p").unwrap();
        assert!(!p.is_match("style.css"));
        let v = p.version_of("style1.0.css").unwrap();
        assert_eq!(v, Version::parse("1.0", None).unwrap());
        assert!(p.version_of("style.css").is_none());
    }
}
