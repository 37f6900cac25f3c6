//! Named-library recognition table.
//!
//! Each ordering groups well-known library files by name. Position in the
//! list is the group's priority; position within a group orders its members.

use crate::error::Result;
use crate::pattern::FileNamePattern;

/// A named group of file-name patterns.
#[derive(Debug, Clone)]
pub struct BundleFileSetOrdering {
    pub name: String,
    files: Vec<FileNamePattern>,
}

impl BundleFileSetOrdering {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    fn builtin(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            files: patterns.iter().map(|p| FileNamePattern::builtin(p)).collect(),
        }
    }

    /// Append a member pattern (`jquery.js`, `jquery-*`, `*.theme.css`).
    pub fn add(&mut self, pattern: &str) -> Result<&mut Self> {
        self.files.push(FileNamePattern::compile(pattern, "item")?);
        Ok(self)
    }

    /// Index of the first member pattern matching `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|p| p.is_match(name))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(FileNamePattern::as_str)
    }
}

/// Built-in groups, highest priority first.
pub fn default_orderings() -> Vec<BundleFileSetOrdering> {
    vec![
        BundleFileSetOrdering::builtin("css", &["reset.css", "normalize.css"]),
        BundleFileSetOrdering::builtin(
            "jquery",
            &[
                "jquery.js",
                "jquery-min.js",
                "jquery-*",
                "jquery-ui*",
                "jquery.ui*",
                "jquery.unobtrusive*",
                "jquery.validate*",
            ],
        ),
        BundleFileSetOrdering::builtin("modernizr", &["modernizr-*"]),
        BundleFileSetOrdering::builtin("dojo", &["dojo.*"]),
        BundleFileSetOrdering::builtin("moo", &["mootools-core*", "mootools-*"]),
        BundleFileSetOrdering::builtin("prototype", &["prototype.js", "prototype-*", "scriptaculous-*"]),
        BundleFileSetOrdering::builtin("ext", &["ext.js", "ext-*"]),
    ]
}

/// Sort key of `name`: `(group rank, member index)`, unknown files last.
pub fn rank(orderings: &[BundleFileSetOrdering], name: &str) -> (usize, usize) {
    orderings
        .iter()
        .enumerate()
        .find_map(|(group, ordering)| ordering.position(name).map(|member| (group, member)))
        .unwrap_or((usize::MAX, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups() {
        let orderings = default_orderings();
        let names: Vec<_> = orderings.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["css", "jquery", "modernizr", "dojo", "moo", "prototype", "ext"]);
    }

    #[test]
    fn test_rank() {
        let orderings = default_orderings();
        assert_eq!(rank(&orderings, "reset.css"), (0, 0));
        assert_eq!(rank(&orderings, "Normalize.css"), (0, 1));
        assert_eq!(rank(&orderings, "jquery.js"), (1, 0));
        assert_eq!(rank(&orderings, "jquery-1.7.1.js"), (1, 2));
        assert_eq!(rank(&orderings, "jquery.validate.js"), (1, 6));
        assert_eq!(rank(&orderings, "modernizr-2.5.js"), (2, 0));
        assert_eq!(rank(&orderings, "dojo.js"), (3, 0));
        assert_eq!(rank(&orderings, "mootools-core.js"), (4, 0));
        assert_eq!(rank(&orderings, "scriptaculous-x.js"), (5, 2));
        assert_eq!(rank(&orderings, "ext-all.js"), (6, 1));
        assert_eq!(rank(&orderings, "site.js"), (usize::MAX, 0));
    }

    #[test]
    fn test_custom_ordering() {
        let mut ordering = BundleFileSetOrdering::new("mine");
        ordering.add("core.js").unwrap().add("plugin-*").unwrap();
        assert_eq!(ordering.position("plugin-a.js"), Some(1));
        assert!(ordering.add("a*b").is_err());
        assert_eq!(ordering.patterns().collect::<Vec<_>>(), ["core.js", "plugin-*"]);
    }
}
