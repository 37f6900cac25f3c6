//! Sheaf - a web-asset bundler and minifier.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use sheaf::cli::{self, Cli, Commands};
use sheaf::config::SheafConfig;
use sheaf::logger;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    cli::serve::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SheafConfig::load(&cli)?;
    let collection = config.build_collection()?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build_all(&config, &collection),
        Commands::List { json } => cli::list::list_bundles(&collection, *json),
        Commands::Url { path } => cli::url::print_url(&collection, path),
        Commands::Render {
            paths,
            styles,
            format,
            ..
        } => cli::render::print_tags(&collection, paths, *styles, format.as_deref()),
        Commands::Serve { .. } => cli::serve::serve(&config, collection),
    }
}
