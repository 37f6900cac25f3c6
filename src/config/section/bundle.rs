//! `[[bundle]]` and `[[dynamic]]` tables.
//!
//! # Example
//!
//! ```toml
//! [[bundle]]
//! path = "~/bundles/site"
//! kind = "script"                      # script | style | plain
//! include = ["~/js/jquery-{version}.js", "~/js/site/*.js"]
//! concatenation_token = ";"            # Optional separator override
//! cdn_path = "https://cdn.example.com/site.js"
//! cdn_fallback_expression = "window.Site"
//! file_extension_replacements = true   # Prefer .min/.debug siblings
//! rewrite_css_urls = false             # Rebase url(...) in included CSS
//!
//! [[bundle.directory]]
//! path = "~/js/plugins"
//! pattern = "*.js"
//! recursive = true
//!
//! [[dynamic]]
//! suffix = "css"                       # Serves ~/<any dir>/css
//! pattern = "*.css"
//! kind = "style"
//! recursive = false
//! ```

use crate::bundle::Bundle;
use crate::error::BundleError;
use crate::transform::{BundleTransform, CssRewriteUrlTransform, ItemTransform};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleKindConfig {
    Script,
    Style,
    #[default]
    Plain,
}

impl BundleKindConfig {
    fn transform(self) -> Option<BundleTransform> {
        match self {
            Self::Script => Some(BundleTransform::JsMinify),
            Self::Style => Some(BundleTransform::CssMinify),
            Self::Plain => None,
        }
    }
}

/// A directory scan inside a `[[bundle]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: String,
    pub pattern: String,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub path: String,

    #[serde(default)]
    pub kind: BundleKindConfig,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub directory: Vec<DirectoryConfig>,

    pub concatenation_token: Option<String>,

    pub cdn_path: Option<String>,

    pub cdn_fallback_expression: Option<String>,

    #[serde(default = "default_true")]
    pub file_extension_replacements: bool,

    #[serde(default)]
    pub rewrite_css_urls: bool,
}

fn default_true() -> bool {
    true
}

impl BundleConfig {
    pub fn to_bundle(&self) -> Result<Bundle, BundleError> {
        let mut bundle = match self.kind {
            BundleKindConfig::Script => Bundle::script(&self.path)?,
            BundleKindConfig::Style => Bundle::style(&self.path)?,
            BundleKindConfig::Plain => Bundle::new(&self.path)?,
        };

        let item_transforms = if self.rewrite_css_urls {
            vec![ItemTransform::CssRewriteUrl(CssRewriteUrlTransform)]
        } else {
            Vec::new()
        };
        for include in &self.include {
            bundle.include_with(include, item_transforms.clone())?;
        }
        for dir in &self.directory {
            bundle.include_directory(&dir.path, &dir.pattern, dir.recursive)?;
        }

        if let Some(token) = &self.concatenation_token {
            bundle.set_concatenation_token(token.as_str());
        }
        if let Some(cdn) = &self.cdn_path {
            bundle.set_cdn_path(cdn)?;
        }
        if let Some(expression) = &self.cdn_fallback_expression {
            bundle.set_cdn_fallback_expression(expression);
        }
        bundle.set_enable_file_extension_replacements(self.file_extension_replacements);
        Ok(bundle)
    }
}

/// A `[[dynamic]]` folder bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicConfig {
    pub suffix: String,
    pub pattern: String,
    #[serde(default)]
    pub kind: BundleKindConfig,
    #[serde(default)]
    pub recursive: bool,
}

impl DynamicConfig {
    pub fn to_bundle(&self) -> Result<Bundle, BundleError> {
        let mut bundle = Bundle::dynamic_folder(&self.suffix, &self.pattern, self.recursive)?;
        if let Some(transform) = self.kind.transform() {
            bundle.add_transform(transform);
        }
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use crate::bundle::BundleKind;
    use crate::config::test_parse_config;
    use crate::error::BundleError;

    #[test]
    fn test_bundle_table() {
        let config = test_parse_config(
            r#"
[[bundle]]
path = "~/bundles/site"
kind = "script"
include = ["~/js/a.js", "~/js/lib/*.js"]
cdn_path = "https://cdn/site.js"
cdn_fallback_expression = "window.Site"

[[bundle.directory]]
path = "~/js/plugins"
pattern = "*.js"
recursive = true
"#,
        );
        let bundle = config.bundle[0].to_bundle().unwrap();
        assert!(matches!(bundle.kind(), BundleKind::Script));
        assert_eq!(bundle.items().len(), 3);
        assert_eq!(bundle.cdn_path(), Some("https://cdn/site.js"));
        assert_eq!(bundle.cdn_fallback_expression(), Some("window.Site"));
        assert_eq!(bundle.effective_concatenation_token(), ";\n");
    }

    #[test]
    fn test_bundle_defaults_to_plain() {
        let config = test_parse_config(
            "[[bundle]]\npath = \"~/b\"\ninclude = [\"~/a.txt\"]\nconcatenation_token = \"\\n\"",
        );
        let bundle = config.bundle[0].to_bundle().unwrap();
        assert!(matches!(bundle.kind(), BundleKind::Plain));
        assert!(bundle.transforms().is_empty());
        assert_eq!(bundle.effective_concatenation_token(), "\n");
    }

    #[test]
    fn test_bundle_errors_surface() {
        let config = test_parse_config("[[bundle]]\npath = \"/abs\"");
        assert!(matches!(
            config.bundle[0].to_bundle(),
            Err(BundleError::NotAppRelative { .. })
        ));

        let config = test_parse_config("[[bundle]]\npath = \"~/b\"\ninclude = [\"~/a/*/b.js\"]");
        assert!(matches!(
            config.bundle[0].to_bundle(),
            Err(BundleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_dynamic_table() {
        let config = test_parse_config(
            "[[dynamic]]\nsuffix = \"css\"\npattern = \"*.css\"\nkind = \"style\"\nrecursive = true",
        );
        let bundle = config.dynamic[0].to_bundle().unwrap();
        assert!(bundle.is_dynamic());
        assert_eq!(bundle.type_name(), "DynamicFolderBundle");
        assert_eq!(bundle.transforms().len(), 1);
        assert!(bundle.matches_dynamic("~/pages/home/CSS"));
    }
}
