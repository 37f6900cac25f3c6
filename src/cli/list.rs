//! `sheaf list`: show registered bundles and what they resolve to.

use crate::{bundle::Bundle, collection::BundleCollection};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

/// One bundle as printed by `sheaf list`.
#[derive(Debug, Serialize)]
pub struct BundleListing {
    pub path: String,
    pub kind: &'static str,
    pub url: Option<String>,
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BundleListing {
    fn new(collection: &BundleCollection, bundle: &Bundle) -> Self {
        let mut listing = Self {
            path: bundle.path().to_string(),
            kind: bundle.type_name(),
            url: None,
            files: Vec::new(),
            cdn_path: bundle.cdn_path().map(str::to_string),
            error: None,
        };
        // Dynamic bundles only resolve relative to a requested folder.
        if bundle.is_dynamic() {
            return listing;
        }

        let resolved = collection.resolve_bundle_url(bundle.path()).and_then(|url| {
            let files = bundle.enumerate_files(&collection.context(bundle.path()))?;
            Ok((url, files))
        });
        match resolved {
            Ok((url, files)) => {
                listing.url = Some(url);
                listing.files = files.iter().map(|f| f.virtual_path().to_string()).collect();
            }
            Err(e) => listing.error = Some(e.to_string()),
        }
        listing
    }
}

/// Collect listings for every registered bundle, static ones first.
pub fn collect(collection: &BundleCollection) -> Vec<BundleListing> {
    collection
        .registered_bundles()
        .iter()
        .map(|bundle| BundleListing::new(collection, bundle))
        .collect()
}

/// Print the bundle listing as text or JSON.
pub fn list_bundles(collection: &BundleCollection, json: bool) -> Result<()> {
    let listings = collect(collection);

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    for listing in &listings {
        println!("{} {}", listing.path.bold(), format!("({})", listing.kind).dimmed());
        if let Some(url) = &listing.url {
            println!("  url: {url}");
        }
        if let Some(cdn) = &listing.cdn_path {
            println!("  cdn: {cdn}");
        }
        if let Some(error) = &listing.error {
            println!("  {} {error}", "error:".red());
        }
        for file in &listing.files {
            println!("  - {file}");
        }
    }
    Ok(())
}
