//! `[optimization]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [optimization]
//! enable = true             # Minify and prefer .min siblings
//! instrumentation = false   # Annotate output with file boundaries
//! use_cdn = false           # Reference CDN paths where configured
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    pub enable: bool,
    pub instrumentation: bool,
    pub use_cdn: bool,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            instrumentation: false,
            use_cdn: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_optimization_defaults() {
        let config = test_parse_config("");
        assert!(config.optimization.enable);
        assert!(!config.optimization.instrumentation);
        assert!(!config.optimization.use_cdn);
    }

    #[test]
    fn test_optimization_config() {
        let config = test_parse_config("[optimization]\nenable = false\nuse_cdn = true");
        assert!(!config.optimization.enable);
        assert!(config.optimization.use_cdn);
    }
}
