//! Bundle error types.
//!
//! Configuration errors are raised at setup time and name the offending
//! parameter. Resolution errors surface per request and never poison the
//! build cache.

use thiserror::Error;

/// Errors raised while registering or resolving bundles.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error(
        "Invalid pattern: '{pattern}'. Wildcards are only allowed in the last path segment, \
         can contain only one leading or trailing wildcard, and cannot be used with {{version}}. \
         (parameter `{param}`)"
    )]
    InvalidPattern { pattern: String, param: &'static str },

    #[error("Pure wildcard search patterns '*' and '*.*' are not supported. (parameter `{param}`)")]
    PureWildcard { param: &'static str },

    #[error(
        "The URL '{path}' is not valid. Only application relative URLs (~/url) are allowed. \
         (parameter `{param}`)"
    )]
    NotAppRelative { path: String, param: &'static str },

    #[error("Value cannot be empty. (parameter `{param}`)")]
    EmptyArgument { param: &'static str },

    #[error("Invalid optimization mode `{0}`, expected one of `Always`, `WhenEnabled`, `WhenDisabled`")]
    InvalidMode(String),

    #[error(
        "Invalid dynamic folder suffix '{0}': it must not start with '/' or '~' and must not \
         contain '?'"
    )]
    InvalidSuffix(String),

    #[error("Dynamic folder bundles do not support a CDN path")]
    CdnNotSupported,

    #[error("Directory does not exist: '{path}' (parameter `{param}`)")]
    DirectoryNotFound { path: String, param: &'static str },

    #[error("File not found: '{0}'")]
    FileNotFound(String),

    #[error("IO error when reading `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BundleError {
    pub(crate) fn invalid_pattern(pattern: impl Into<String>, param: &'static str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            param,
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors raised while resolving files (as opposed to setup).
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. } | Self::FileNotFound(_) | Self::Io { .. }
        )
    }
}

pub type Result<T, E = BundleError> = std::result::Result<T, E>;
