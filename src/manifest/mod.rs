//! XML bundle manifest.
//!
//! ```xml
//! <bundles version="1.0">
//!   <styleBundle path="~/bundles/site.css" cdnPath="https://cdn/site.css">
//!     <include path="~/css/*.css" />
//!   </styleBundle>
//!   <scriptBundle path="~/bundles/jquery" cdnFallbackExpression="window.jQuery">
//!     <include path="~/js/jquery-{version}.js" />
//!   </scriptBundle>
//! </bundles>
//! ```
//!
//! Element and attribute names are case-sensitive; anything outside this
//! schema is rejected.

use crate::bundle::Bundle;
use crate::collection::BundleCollection;
use crate::error::BundleError;
use crate::vfs::{self, VirtualPathProvider};
use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::{EscapeError, unescape};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Manifest location used when none is configured.
pub const DEFAULT_MANIFEST_PATH: &str = "~/bundle.config";

const SUPPORTED_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("malformed manifest XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed manifest attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("invalid escape in manifest: {0}")]
    Escape(#[from] EscapeError),

    #[error("manifest is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unexpected element <{name}> at byte {position}")]
    UnexpectedElement { name: String, position: u64 },

    #[error("unknown attribute `{attribute}` on <{element}>")]
    UnknownAttribute { element: String, attribute: String },

    #[error("<{element}> requires attribute `{attribute}`")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("unsupported manifest version `{0}` (expected {SUPPORTED_VERSION})")]
    UnsupportedVersion(String),

    #[error("manifest has no <bundles> root element")]
    MissingRoot,

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestBundleKind {
    Style,
    Script,
}

/// One `<styleBundle>` or `<scriptBundle>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestBundle {
    pub kind: ManifestBundleKind,
    pub path: String,
    pub cdn_path: Option<String>,
    pub cdn_fallback_expression: Option<String>,
    pub includes: Vec<String>,
}

impl ManifestBundle {
    /// Materialize as a style or script bundle.
    pub fn to_bundle(&self) -> Result<Bundle, BundleError> {
        let mut bundle = match self.kind {
            ManifestBundleKind::Style => Bundle::style(&self.path)?,
            ManifestBundleKind::Script => Bundle::script(&self.path)?,
        };
        if let Some(cdn) = &self.cdn_path {
            bundle.set_cdn_path(cdn)?;
        }
        if let Some(expression) = &self.cdn_fallback_expression {
            bundle.set_cdn_fallback_expression(expression);
        }
        for include in &self.includes {
            bundle.include(include)?;
        }
        Ok(bundle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleManifest {
    pub version: Option<String>,
    pub style_bundles: Vec<ManifestBundle>,
    pub script_bundles: Vec<ManifestBundle>,
}

impl BundleManifest {
    pub fn parse(xml: &str) -> Result<Self, ManifestError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut manifest = Self::default();
        let mut seen_root = false;
        let mut current: Option<ManifestBundle> = None;
        let mut depth = 0usize;

        loop {
            let (start, empty) = match reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 1
                        && let Some(bundle) = current.take()
                    {
                        manifest.push(bundle);
                    }
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            let qname = start.name();
            let name = std::str::from_utf8(qname.as_ref())?;
            match (depth, name) {
                (0, "bundles") if !seen_root => {
                    seen_root = true;
                    let mut attrs = read_attributes(&start, name, &["version"])?;
                    if let Some(version) = attrs.take("version")
                        && version != SUPPORTED_VERSION
                    {
                        return Err(ManifestError::UnsupportedVersion(version));
                    }
                    manifest.version = Some(SUPPORTED_VERSION.to_string());
                }
                (1, "styleBundle") => {
                    let mut attrs = read_attributes(&start, name, &["path", "cdnPath"])?;
                    current = Some(ManifestBundle {
                        kind: ManifestBundleKind::Style,
                        path: attrs.require(name, "path")?,
                        cdn_path: attrs.take("cdnPath"),
                        cdn_fallback_expression: None,
                        includes: Vec::new(),
                    });
                }
                (1, "scriptBundle") => {
                    let mut attrs = read_attributes(
                        &start,
                        name,
                        &["path", "cdnPath", "cdnFallbackExpression"],
                    )?;
                    current = Some(ManifestBundle {
                        kind: ManifestBundleKind::Script,
                        path: attrs.require(name, "path")?,
                        cdn_path: attrs.take("cdnPath"),
                        cdn_fallback_expression: attrs.take("cdnFallbackExpression"),
                        includes: Vec::new(),
                    });
                }
                (2, "include") => {
                    let mut attrs = read_attributes(&start, name, &["path"])?;
                    let path = attrs.require(name, "path")?;
                    if let Some(bundle) = current.as_mut() {
                        bundle.includes.push(path);
                    }
                }
                _ => {
                    return Err(ManifestError::UnexpectedElement {
                        name: name.to_string(),
                        position: reader.buffer_position(),
                    });
                }
            }

            if !empty {
                depth += 1;
            } else if depth == 1
                && let Some(bundle) = current.take()
            {
                manifest.push(bundle);
            }
        }

        if !seen_root {
            return Err(ManifestError::MissingRoot);
        }
        Ok(manifest)
    }

    /// Read a manifest through a file provider. A missing file is `None`.
    pub fn read(
        provider: &dyn VirtualPathProvider,
        virtual_path: &str,
    ) -> Result<Option<Self>, ManifestError> {
        if !provider.file_exists(virtual_path) {
            return Ok(None);
        }
        let xml = vfs::read_to_string(provider, virtual_path).map_err(|source| {
            ManifestError::Io {
                path: PathBuf::from(virtual_path),
                source,
            }
        })?;
        Self::parse(&xml).map(Some)
    }

    pub fn read_file(path: &Path) -> Result<Self, ManifestError> {
        let xml = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(xml.trim_start_matches('\u{feff}'))
    }

    fn push(&mut self, bundle: ManifestBundle) {
        match bundle.kind {
            ManifestBundleKind::Style => self.style_bundles.push(bundle),
            ManifestBundleKind::Script => self.script_bundles.push(bundle),
        }
    }

    pub fn len(&self) -> usize {
        self.style_bundles.len() + self.script_bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add every bundle to `collection`: style bundles first, then scripts.
    pub fn register(&self, collection: &mut BundleCollection) -> Result<Vec<Arc<Bundle>>, BundleError> {
        self.style_bundles
            .iter()
            .chain(&self.script_bundles)
            .map(|entry| entry.to_bundle().map(|bundle| collection.add(bundle)))
            .collect()
    }
}

/// Attributes of one element, checked against its allowed names.
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn take(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.swap_remove(index).1)
    }

    fn require(&mut self, element: &str, key: &'static str) -> Result<String, ManifestError> {
        self.take(key).ok_or_else(|| ManifestError::MissingAttribute {
            element: element.to_string(),
            attribute: key,
        })
    }
}

fn read_attributes(
    start: &BytesStart<'_>,
    element: &str,
    allowed: &[&str],
) -> Result<Attributes, ManifestError> {
    let mut out = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        if !allowed.contains(&key) {
            return Err(ManifestError::UnknownAttribute {
                element: element.to_string(),
                attribute: key.to_string(),
            });
        }
        let raw = std::str::from_utf8(&attr.value)?;
        out.push((key.to_string(), unescape(raw)?.into_owned()));
    }
    Ok(Attributes(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFileProvider;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<bundles version="1.0">
  <!-- styles -->
  <styleBundle path="~/bundles/site.css" cdnPath="https://cdn.example.com/site.css">
    <include path="~/css/reset.css" />
    <include path="~/css/*.css" />
  </styleBundle>
  <scriptBundle path="~/bundles/jquery" cdnFallbackExpression="window.jQuery &amp;&amp; true">
    <include path="~/js/jquery-{version}.js" />
  </scriptBundle>
  <scriptBundle path="~/bundles/empty" />
</bundles>"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = BundleManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.0"));
        assert_eq!(manifest.len(), 3);

        let style = &manifest.style_bundles[0];
        assert_eq!(style.kind, ManifestBundleKind::Style);
        assert_eq!(style.path, "~/bundles/site.css");
        assert_eq!(
            style.cdn_path.as_deref(),
            Some("https://cdn.example.com/site.css")
        );
        assert_eq!(style.includes, ["~/css/reset.css", "~/css/*.css"]);

        let script = &manifest.script_bundles[0];
        assert_eq!(
            script.cdn_fallback_expression.as_deref(),
            Some("window.jQuery && true")
        );
        assert_eq!(script.includes, ["~/js/jquery-{version}.js"]);
        assert!(manifest.script_bundles[1].includes.is_empty());
    }

    #[test]
    fn test_rejects_unknown_element() {
        let xml = r#"<bundles><styleBundle path="~/a"><exclude path="~/x" /></styleBundle></bundles>"#;
        assert!(matches!(
            BundleManifest::parse(xml),
            Err(ManifestError::UnexpectedElement { name, .. }) if name == "exclude"
        ));
    }

    #[test]
    fn test_rejects_wrong_case_names() {
        let xml = r#"<bundles><StyleBundle path="~/a" /></bundles>"#;
        assert!(matches!(
            BundleManifest::parse(xml),
            Err(ManifestError::UnexpectedElement { .. })
        ));

        let xml = r#"<bundles><scriptBundle path="~/a" CdnPath="x" /></bundles>"#;
        assert!(matches!(
            BundleManifest::parse(xml),
            Err(ManifestError::UnknownAttribute { attribute, .. }) if attribute == "CdnPath"
        ));
    }

    #[test]
    fn test_fallback_only_on_scripts() {
        let xml = r#"<bundles><styleBundle path="~/a" cdnFallbackExpression="x" /></bundles>"#;
        assert!(matches!(
            BundleManifest::parse(xml),
            Err(ManifestError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_missing_path_and_root() {
        assert!(matches!(
            BundleManifest::parse("<bundles><scriptBundle /></bundles>"),
            Err(ManifestError::MissingAttribute { attribute: "path", .. })
        ));
        assert!(matches!(
            BundleManifest::parse(""),
            Err(ManifestError::MissingRoot)
        ));
        assert!(matches!(
            BundleManifest::parse(r#"<bundles version="2.0" />"#),
            Err(ManifestError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_register_into_collection() {
        let provider = Arc::new(MemoryFileProvider::new());
        provider.add_file("~/css/reset.css", "html { margin: 0 }");
        provider.add_file("~/css/site.css", "body { color: red }");
        provider.add_file("~/js/jquery-1.7.1.js", "var jq = 1;");
        provider.add_file("~/bundle.config", MANIFEST);

        let manifest = BundleManifest::read(provider.as_ref(), DEFAULT_MANIFEST_PATH)
            .unwrap()
            .unwrap();
        let mut collection = BundleCollection::new(provider);
        let added = manifest.register(&mut collection).unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(added[0].type_name(), "StyleBundle");
        assert_eq!(added[1].type_name(), "ScriptBundle");

        let css = collection
            .get_bundle_response("~/bundles/site.css")
            .unwrap()
            .unwrap();
        assert_eq!(css.content, "html{margin:0}body{color:red}");
    }

    #[test]
    fn test_read_missing_manifest() {
        let provider = MemoryFileProvider::new();
        assert!(BundleManifest::read(&provider, "~/bundle.config")
            .unwrap()
            .is_none());
    }
}
