//! JavaScript and CSS minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. A minifier error never
//! fails the bundle: the unminified content is served behind a comment block
//! listing the errors.

use super::{CSS_CONTENT_TYPE, JS_CONTENT_TYPE};
use crate::bundle::{BundleContext, BundleResponse};
use crate::debug;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// First line of the fallback comment.
pub const FAILURE_HEADER: &str = "Minification failed. Returning unminified contents.";

/// Minify JavaScript source code.
///
/// Statements are kept as written (no compression pass) so bundled files
/// stay `;`-joined; locals are mangled.
pub fn minify_js(source: &str) -> Result<String, Vec<String>> {
    let allocator = Allocator::default();
    let source_type = SourceType::cjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(ret.errors.iter().map(ToString::to_string).collect());
    }
    if ret.panicked {
        return Err(vec!["parser aborted".to_string()]);
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: None,
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, Vec<String>> {
    let stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| vec![e.to_string()])?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| vec![e.to_string()])?;
    Ok(result.code)
}

/// Unminified content prefixed with a comment listing `errors`.
pub fn failure_report(errors: &[String], original: &str) -> String {
    let mut out = format!("/* {FAILURE_HEADER}\r\n");
    for error in errors {
        // A stray terminator would end the comment early.
        out.push_str(&error.replace("*/", "* /"));
        out.push_str("\r\n");
    }
    out.push_str(" */\r\n");
    out.push_str(original);
    out
}

fn apply(
    ctx: &BundleContext<'_>,
    response: &mut BundleResponse,
    minify: fn(&str) -> Result<String, Vec<String>>,
) {
    if ctx.enable_instrumentation {
        return;
    }
    response.content = match minify(&response.content) {
        Ok(code) => code,
        Err(errors) => {
            debug!("minify"; "{} failed: {}", ctx.bundle_virtual_path, errors.join("; "));
            failure_report(&errors, &response.content)
        }
    };
}

pub(super) fn process_js(ctx: &BundleContext<'_>, response: &mut BundleResponse) {
    apply(ctx, response, minify_js);
    response.content_type = JS_CONTENT_TYPE.to_string();
}

pub(super) fn process_css(ctx: &BundleContext<'_>, response: &mut BundleResponse) {
    apply(ctx, response, minify_css);
    response.content_type = CSS_CONTENT_TYPE.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_js_strips_comments_and_whitespace() {
        let out = minify_js("//I am a comment\r\nfoo = bar;\r\nfoo = yes;").unwrap();
        assert_eq!(out, "foo=bar;foo=yes");
    }

    #[test]
    fn test_minify_js_joins_statements() {
        let out = minify_js("alert('1');\nalert('2');\n").unwrap();
        assert_eq!(out, r#"alert("1");alert("2")"#);
    }

    #[test]
    fn test_minify_js_reports_syntax_errors() {
        let errors = minify_js("function (").unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_minify_css() {
        let out = minify_css("body {\n  margin: 0;\n}\n").unwrap();
        assert_eq!(out, "body{margin:0}");
    }

    #[test]
    fn test_minify_css_reports_errors() {
        assert!(minify_css("..invalid { color: red; }").is_err());
    }

    #[test]
    fn test_failure_report_layout() {
        let report = failure_report(&["bad */ thing".to_string()], "a { }");
        assert_eq!(
            report,
            "/* Minification failed. Returning unminified contents.\r\nbad * / thing\r\n */\r\na { }"
        );
    }
}
