//! Ignore patterns applied to directory scans.

use super::OptimizationMode;
use crate::error::Result;
use crate::pattern::FileNamePattern;

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: FileNamePattern,
    mode: OptimizationMode,
}

/// Ordered ignore patterns; any active match ignores a file.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    rules: Vec<IgnoreRule>,
}

impl IgnoreList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in list: tooling artifacts always, and whichever of the
    /// debug/minified twins does not fit the current mode.
    pub fn with_defaults() -> Self {
        let mut list = Self::new();
        let defaults = [
            ("*.intellisense.js", OptimizationMode::Always),
            ("*-vsdoc.js", OptimizationMode::Always),
            ("*.map", OptimizationMode::Always),
            ("*.debug.js", OptimizationMode::WhenEnabled),
            ("*.min.js", OptimizationMode::WhenDisabled),
            ("*.min.css", OptimizationMode::WhenDisabled),
        ];
        for (pattern, mode) in defaults {
            list.rules.push(IgnoreRule {
                pattern: FileNamePattern::builtin(pattern),
                mode,
            });
        }
        list
    }

    /// Ignore `pattern` regardless of mode.
    pub fn ignore(&mut self, pattern: &str) -> Result<()> {
        self.ignore_with_mode(pattern, OptimizationMode::Always)
    }

    pub fn ignore_with_mode(&mut self, pattern: &str, mode: OptimizationMode) -> Result<()> {
        let pattern = FileNamePattern::compile(pattern, "item")?;
        self.rules.push(IgnoreRule { pattern, mode });
        Ok(())
    }

    /// Check a file name against every rule active in this mode.
    ///
    /// Empty names are always ignored.
    pub fn should_ignore(&self, enable_optimizations: bool, name: &str) -> bool {
        if name.is_empty() {
            return true;
        }
        self.rules
            .iter()
            .any(|r| r.mode.is_active(enable_optimizations) && r.pattern.is_match(name))
    }

    /// Remove every rule, defaults included.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered `(pattern, mode)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, OptimizationMode)> {
        self.rules.iter().map(|r| (r.pattern.as_str(), r.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_all() {
        let mut list = IgnoreList::new();
        list.ignore("*").unwrap();
        assert!(list.should_ignore(true, "anything.js"));
        assert!(list.should_ignore(false, "x"));
    }

    #[test]
    fn test_empty_name_always_ignored() {
        assert!(IgnoreList::new().should_ignore(true, ""));
    }

    #[test]
    fn test_prefix_suffix_exact() {
        let mut list = IgnoreList::new();
        list.ignore("*.spec.js").unwrap();
        list.ignore("_*").unwrap();
        list.ignore("Legacy.js").unwrap();
        assert!(list.should_ignore(true, "app.SPEC.js"));
        assert!(list.should_ignore(true, "_partial.css"));
        assert!(list.should_ignore(true, "legacy.js"));
        assert!(!list.should_ignore(true, "app.js"));
        assert!(!list.should_ignore(true, "legacy.js.map"));
    }

    #[test]
    fn test_version_pattern() {
        let mut list = IgnoreList::new();
        list.ignore("jquery-{version}.js").unwrap();
        assert!(list.should_ignore(false, "jquery-1.7.1.js"));
        assert!(!list.should_ignore(false, "jquery-ui.js"));
    }

    #[test]
    fn test_mode_gating() {
        let mut list = IgnoreList::new();
        list.ignore_with_mode("*.opt.js", OptimizationMode::WhenEnabled).unwrap();
        list.ignore_with_mode("*.dbg.js", OptimizationMode::WhenDisabled).unwrap();
        list.ignore_with_mode("*.any.js", OptimizationMode::Always).unwrap();

        assert!(list.should_ignore(true, "a.opt.js"));
        assert!(!list.should_ignore(false, "a.opt.js"));
        assert!(!list.should_ignore(true, "a.dbg.js"));
        assert!(list.should_ignore(false, "a.dbg.js"));
        assert!(list.should_ignore(true, "a.any.js"));
        assert!(list.should_ignore(false, "a.any.js"));
    }

    #[test]
    fn test_defaults() {
        let list = IgnoreList::with_defaults();
        assert_eq!(list.len(), 6);
        assert!(list.should_ignore(true, "jquery-vsdoc.js"));
        assert!(list.should_ignore(false, "app.intellisense.js"));
        assert!(list.should_ignore(false, "site.css.map"));
        assert!(list.should_ignore(true, "app.debug.js"));
        assert!(!list.should_ignore(false, "app.debug.js"));
        assert!(list.should_ignore(false, "app.min.js"));
        assert!(!list.should_ignore(true, "app.min.js"));
        assert!(list.should_ignore(false, "site.min.css"));
        assert!(!list.should_ignore(true, "site.css"));
    }

    #[test]
    fn test_clear_removes_defaults() {
        let mut list = IgnoreList::with_defaults();
        list.clear();
        assert!(list.is_empty());
        assert!(!list.should_ignore(false, "app.min.js"));
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        let mut list = IgnoreList::new();
        assert!(list.ignore("").is_err());
        assert!(list.ignore("a*b").is_err());
    }
}
