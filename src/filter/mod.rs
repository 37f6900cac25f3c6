//! Optimization-mode gated file filters.
//!
//! - [`IgnoreList`] drops files from directory scans
//! - [`FileExtensionReplacementList`] swaps a file for its `.min` / `.debug` twin

mod ignore;
mod replace;

pub use ignore::IgnoreList;
pub use replace::{FileExtensionReplacement, FileExtensionReplacementList};

use crate::error::BundleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When a filter rule is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OptimizationMode {
    #[default]
    Always,
    /// Only while optimizations are enabled (release).
    WhenEnabled,
    /// Only while optimizations are disabled (debug).
    WhenDisabled,
}

impl OptimizationMode {
    #[inline]
    pub const fn is_active(self, enable_optimizations: bool) -> bool {
        match self {
            Self::Always => true,
            Self::WhenEnabled => enable_optimizations,
            Self::WhenDisabled => !enable_optimizations,
        }
    }
}

impl FromStr for OptimizationMode {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "whenenabled" | "when_enabled" => Ok(Self::WhenEnabled),
            "whendisabled" | "when_disabled" => Ok(Self::WhenDisabled),
            _ => Err(BundleError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Always => "Always",
            Self::WhenEnabled => "WhenEnabled",
            Self::WhenDisabled => "WhenDisabled",
        })
    }
}
