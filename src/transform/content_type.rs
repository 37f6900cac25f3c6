//! Content-type inference for bundles without a minifier.

use crate::bundle::BundleResponse;
use crate::vpath;

pub const JS_CONTENT_TYPE: &str = "text/javascript";
pub const CSS_CONTENT_TYPE: &str = "text/css";

/// Leaves content untouched and sets the content type.
///
/// An explicit type wins. Otherwise a response without a type takes one
/// from the first file's extension (`.js` or `.css`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultTransform {
    content_type: Option<String>,
}

impl DefaultTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
        }
    }

    pub fn process(&self, response: &mut BundleResponse) {
        if let Some(content_type) = &self.content_type {
            response.content_type = content_type.clone();
            return;
        }
        if !response.content_type.is_empty() {
            return;
        }
        let inferred = response
            .files
            .first()
            .and_then(|f| vpath::extension(&f.file.virtual_path))
            .and_then(|ext| match ext.as_str() {
                "js" => Some(JS_CONTENT_TYPE),
                "css" => Some(CSS_CONTENT_TYPE),
                _ => None,
            });
        if let Some(content_type) = inferred {
            response.content_type = content_type.to_string();
        }
    }
}
