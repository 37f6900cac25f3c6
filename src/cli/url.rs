//! `sheaf url`: print the URL a page should reference.

use crate::collection::BundleCollection;
use anyhow::{Context, Result};

pub fn print_url(collection: &BundleCollection, virtual_path: &str) -> Result<()> {
    let url = collection
        .resolve_bundle_url(virtual_path)
        .with_context(|| format!("failed to resolve `{virtual_path}`"))?;
    println!("{url}");
    Ok(())
}
