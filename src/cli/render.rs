//! `sheaf render`: print the tags a page should include.

use crate::{collection::BundleCollection, render};
use anyhow::{Context, Result};

pub fn print_tags(
    collection: &BundleCollection,
    paths: &[String],
    styles: bool,
    format: Option<&str>,
) -> Result<()> {
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
    let html = match format {
        Some(format) => render::render_format(collection, format, &paths),
        None if styles => render::styles(collection, &paths),
        None => render::scripts(collection, &paths),
    }
    .context("failed to render tags")?;
    print!("{html}");
    Ok(())
}
