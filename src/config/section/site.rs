//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! root = "wwwroot"              # Directory mapped onto ~/
//! application_path = "/"        # URL prefix of ~/
//! manifest = "bundle.config"    # Optional XML bundle manifest
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Physical directory served as `~/`, relative to the config file.
    pub root: PathBuf,

    /// URL base that `~/` resolves to.
    pub application_path: String,

    /// XML manifest path, relative to the config file. When unset,
    /// `~/bundle.config` is read if present.
    pub manifest: Option<PathBuf>,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            application_path: "/".to_string(),
            manifest: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_site_config() {
        let config = test_parse_config(
            "[site]\nroot = \"wwwroot\"\napplication_path = \"/app\"\nmanifest = \"b.xml\"",
        );
        assert_eq!(config.site.root, PathBuf::from("wwwroot"));
        assert_eq!(config.site.application_path, "/app");
        assert_eq!(config.site.manifest, Some(PathBuf::from("b.xml")));
    }

    #[test]
    fn test_site_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.site.root, PathBuf::from("."));
        assert_eq!(config.site.application_path, "/");
        assert!(config.site.manifest.is_none());
    }
}
