//! Concatenation of transformed file contents.
//!
//! Normal output appends the concatenation token after every file.
//! Instrumented output instead emits a preamble and a header per file, all
//! separated by CRLF:
//!
//! ```text
//! /* Bundle=ScriptBundle;Boundary=MQAyADMA...; */
//! /* MQAyADMA... "~/scripts/a.js" */
//! <content of a.js>
//! ```

use super::{BundleContext, BundleFile};
use crate::error::{BundleError, Result};
use crate::utils::hash;
use crate::vfs::{self, VirtualPathProvider};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Default separator.
pub const NEWLINE: &str = "\r\n";

/// Separator for bundles that run the JavaScript minifier.
pub const JS_CONCATENATION_TOKEN: &str = ";\n";

/// Boundary marker derived from the first transform's type name.
///
/// base64 of the UTF-16LE bytes of the decimal name hash.
pub fn instrumentation_boundary(transform_name: &str) -> String {
    let decimal = hash::compute(transform_name).to_string();
    let utf16: Vec<u8> = decimal
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    STANDARD.encode(utf16)
}

/// Read, item-transform and join every file.
pub fn build_content(
    ctx: &BundleContext<'_>,
    provider: &dyn VirtualPathProvider,
    files: &[BundleFile],
    token: &str,
    instrumentation: Option<(&str, &str)>,
) -> Result<String> {
    let mut out = String::new();
    let boundary = instrumentation.map(|(bundle_type, transform_name)| {
        let boundary = instrumentation_boundary(transform_name);
        out.push_str(&format!("/* Bundle={bundle_type};Boundary={boundary}; */{NEWLINE}"));
        boundary
    });

    for file in files {
        let path = file.virtual_path();
        let raw = vfs::read_to_string(provider, path).map_err(|e| BundleError::io(path, e))?;
        let text = file
            .transforms
            .iter()
            .fold(raw, |text, t| t.process(ctx, &file.include_path, text));

        match &boundary {
            Some(boundary) => {
                out.push_str(&format!("/* {boundary} \"{path}\" */{NEWLINE}"));
                out.push_str(&text);
                out.push_str(NEWLINE);
            }
            None => {
                out.push_str(&text);
                out.push_str(token);
            }
        }
    }
    Ok(out)
}
