//! `[ignore]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [ignore]
//! clear_defaults = false         # Drop *.map, *-vsdoc.js, ... first
//! always = ["*.spec.js"]
//! when_enabled = ["*.dev.js"]    # Only while optimizing
//! when_disabled = ["*.prod.js"]  # Only while not optimizing
//! ```

use super::super::{ConfigDiagnostics, FieldPath};
use crate::filter::{IgnoreList, OptimizationMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub clear_defaults: bool,
    pub always: Vec<String>,
    pub when_enabled: Vec<String>,
    pub when_disabled: Vec<String>,
}

impl IgnoreConfig {
    /// Apply to `list`, reporting bad patterns into `diag`.
    pub fn apply(&self, list: &mut IgnoreList, diag: &mut ConfigDiagnostics) {
        if self.clear_defaults {
            list.clear();
        }
        let groups = [
            ("always", &self.always, OptimizationMode::Always),
            ("when_enabled", &self.when_enabled, OptimizationMode::WhenEnabled),
            ("when_disabled", &self.when_disabled, OptimizationMode::WhenDisabled),
        ];
        for (key, patterns, mode) in groups {
            for (i, pattern) in patterns.iter().enumerate() {
                if let Err(e) = list.ignore_with_mode(pattern, mode) {
                    diag.error(FieldPath::new(format!("ignore.{key}[{i}]")), e.to_string());
                }
            }
        }
    }
}
