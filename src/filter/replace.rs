//! Sibling substitution by marker extension (`app.js` -> `app.min.js`).

use super::OptimizationMode;
use crate::error::{BundleError, Result};
use crate::vpath;

/// A marker inserted before the final extension, active in one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtensionReplacement {
    pub marker: String,
    pub mode: OptimizationMode,
}

/// Ordered replacement rules; the first active rule with an existing
/// sibling wins.
#[derive(Debug, Clone, Default)]
pub struct FileExtensionReplacementList {
    rules: Vec<FileExtensionReplacement>,
}

impl FileExtensionReplacementList {
    pub fn new() -> Self {
        Self::default()
    }

    /// `min` when optimizing, `debug` otherwise.
    pub fn with_defaults() -> Self {
        Self {
            rules: vec![
                FileExtensionReplacement {
                    marker: "min".into(),
                    mode: OptimizationMode::WhenEnabled,
                },
                FileExtensionReplacement {
                    marker: "debug".into(),
                    mode: OptimizationMode::WhenDisabled,
                },
            ],
        }
    }

    pub fn add(&mut self, marker: &str, mode: OptimizationMode) -> Result<()> {
        let marker = marker.trim().trim_matches('.');
        if marker.is_empty() {
            return Err(BundleError::EmptyArgument { param: "extension" });
        }
        self.rules.push(FileExtensionReplacement {
            marker: marker.to_string(),
            mode,
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileExtensionReplacement> {
        self.rules.iter()
    }

    /// Find the preferred sibling of `virtual_path`.
    ///
    /// `exists` is asked about each candidate name in rule order. The
    /// nominal file itself need not exist.
    pub fn replacement_for(
        &self,
        virtual_path: &str,
        enable_optimizations: bool,
        mut exists: impl FnMut(&str) -> bool,
    ) -> Option<String> {
        self.rules
            .iter()
            .filter(|r| r.mode.is_active(enable_optimizations))
            .filter_map(|r| with_marker(virtual_path, &r.marker))
            .find(|candidate| exists(candidate))
    }
}

/// Insert `.marker` before the final extension of the last segment.
///
/// Names without an extension, or already carrying the marker, yield `None`.
pub fn with_marker(virtual_path: &str, marker: &str) -> Option<String> {
    let trimmed = virtual_path.strip_suffix('/').unwrap_or(virtual_path);
    let name = vpath::file_name(trimmed);
    let dot = name.rfind('.').filter(|&i| i > 0)?;
    let (stem, ext) = name.split_at(dot);
    if stem
        .to_lowercase()
        .ends_with(&format!(".{}", marker.to_lowercase()))
    {
        return None;
    }
    let dir = &trimmed[..trimmed.len() - name.len()];
    Some(format!("{dir}{stem}.{marker}{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_marker() {
        assert_eq!(with_marker("~/s/a.js", "min").as_deref(), Some("~/s/a.min.js"));
        assert_eq!(
            with_marker("~/s/jquery-1.7.js", "debug").as_deref(),
            Some("~/s/jquery-1.7.debug.js")
        );
        assert_eq!(with_marker("~/s/a", "min"), None);
        assert_eq!(with_marker("~/s/.hidden", "min"), None);
        assert_eq!(with_marker("~/s/a.min.js", "min"), None);
        assert_eq!(with_marker("~/ü.js/", "min").as_deref(), Some("~/ü.min.js"));
        assert_eq!(with_marker("~/é/ü.js", "debug").as_deref(), Some("~/é/ü.debug.js"));
    }

    #[test]
    fn test_defaults_follow_mode() {
        let list = FileExtensionReplacementList::with_defaults();
        let files = ["~/a.min.js", "~/a.debug.js"];
        let exists = |p: &str| files.contains(&p);

        assert_eq!(list.replacement_for("~/a.js", true, exists).as_deref(), Some("~/a.min.js"));
        assert_eq!(list.replacement_for("~/a.js", false, exists).as_deref(), Some("~/a.debug.js"));
        assert_eq!(list.replacement_for("~/b.js", true, exists), None);
    }

    #[test]
    fn test_first_active_rule_wins() {
        let mut list = FileExtensionReplacementList::new();
        list.add("min", OptimizationMode::Always).unwrap();
        list.add(".pack", OptimizationMode::Always).unwrap();
        let exists = |p: &str| p == "~/a.min.js" || p == "~/a.pack.js";
        assert_eq!(list.replacement_for("~/a.js", true, exists).as_deref(), Some("~/a.min.js"));

        let only_pack = |p: &str| p == "~/a.pack.js";
        assert_eq!(list.replacement_for("~/a.js", true, only_pack).as_deref(), Some("~/a.pack.js"));
    }

    #[test]
    fn test_rejects_empty_marker() {
        let mut list = FileExtensionReplacementList::new();
        assert!(list.add(" . ", OptimizationMode::Always).is_err());
    }
}
