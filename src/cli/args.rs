//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Sheaf web-asset bundler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sheaf.toml)
    #[arg(short = 'C', long, default_value = "sheaf.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build every bundle and write it to the output directory
    #[command(visible_alias = "b")]
    Build {
        /// Output directory path (relative to project root)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,

        /// Minify and prefer `.min` siblings
        #[arg(short = 'O', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        optimize: Option<bool>,
    },

    /// List bundles with their versioned URLs and resolved files
    #[command(visible_alias = "l")]
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the URL a page should use for a virtual path
    #[command(visible_alias = "u")]
    Url {
        /// Application-relative path, e.g. `~/bundles/site`
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Print the HTML tags a page should include for some paths
    #[command(visible_alias = "r")]
    Render {
        /// Virtual paths or URLs, in page order
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,

        /// Emit stylesheet `<link>` tags instead of `<script>` tags
        #[arg(long)]
        styles: bool,

        /// Custom tag format; `{0}` is replaced by each URL
        #[arg(long, conflicts_with = "styles")]
        format: Option<String>,

        /// Render bundles as single references instead of their files
        #[arg(short = 'O', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        optimize: Option<bool>,
    },

    /// Serve bundles over HTTP
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Minify and prefer `.min` siblings
        #[arg(short = 'O', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        optimize: Option<bool>,
    },
}

impl Cli {
    /// Optimization override given on the command line, if any.
    pub fn optimize(&self) -> Option<bool> {
        match &self.command {
            Commands::Build { optimize, .. }
            | Commands::Render { optimize, .. }
            | Commands::Serve { optimize, .. } => *optimize,
            _ => None,
        }
    }
}
