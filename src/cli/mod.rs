//! Command-line interface module.

mod args;
pub mod build;
pub mod list;
pub mod render;
pub mod serve;
pub mod url;

pub use args::{Cli, Commands};
