//! Configuration section definitions for `sheaf.toml`.
//!
//! | Section            | Purpose                                          |
//! |--------------------|--------------------------------------------------|
//! | `[site]`           | Web root, application path, manifest             |
//! | `[optimization]`   | Minification, instrumentation, CDN switch        |
//! | `[build]`          | Output directory of `sheaf build`                |
//! | `[serve]`          | HTTP front door                                  |
//! | `[ignore]`         | Directory-scan ignore patterns                   |
//! | `[[bundle]]`       | Static bundles                                   |
//! | `[[dynamic]]`      | Dynamic folder bundles                           |

mod bundle;
mod ignore;
mod optimization;
mod serve;
mod site;

pub use bundle::{BundleConfig, BundleKindConfig, DirectoryConfig, DynamicConfig};
pub use ignore::IgnoreConfig;
pub use optimization::OptimizationConfig;
pub use serve::{BuildSectionConfig, ServeConfig};
pub use site::SiteSectionConfig;
