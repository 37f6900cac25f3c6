//! `sheaf build`: write every static bundle to the output directory.
//!
//! Bundles are built in parallel. `~/bundles/site` lands at
//! `<output>/bundles/site`, so the output tree mirrors the URLs a page
//! references (minus the `?v=` stamp, which only busts caches).

use crate::{
    bundle::{Bundle, BundleKind},
    cache,
    cli::serve::is_shutdown,
    collection::BundleCollection,
    config::SheafConfig,
    log,
    logger::ProgressLine,
    vpath,
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Build and write all static bundles.
pub fn build_all(config: &SheafConfig, collection: &BundleCollection) -> Result<()> {
    let output = &config.build.output;
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;

    let bundles: Vec<Arc<Bundle>> = collection.bundles().cloned().collect();
    if bundles.is_empty() {
        log!("build"; "no bundles registered");
        return Ok(());
    }

    let progress = create_progress(&bundles);
    let has_error = AtomicBool::new(false);

    let urls = bundles
        .par_iter()
        .map(|bundle| {
            if is_shutdown() || has_error.load(Ordering::Relaxed) {
                return Err(anyhow!("Aborted"));
            }
            let result = write_bundle(collection, bundle, output);
            if let Err(e) = &result
                && !has_error.swap(true, Ordering::Relaxed)
            {
                log!("error"; "{}: {:#}", bundle.path(), e);
            }
            progress.inc(counter(bundle));
            result
        })
        .collect::<Result<Vec<_>>>();

    let urls = match urls {
        Ok(urls) => {
            progress.finish();
            urls
        }
        Err(_) => {
            drop(progress);
            return Err(anyhow!("Build failed"));
        }
    };

    for (path, url) in urls {
        log!("build"; "{} -> {}", path, url);
    }
    Ok(())
}

fn create_progress(bundles: &[Arc<Bundle>]) -> ProgressLine {
    let count = |name: &str| bundles.iter().filter(|b| counter(b) == name).count();
    ProgressLine::new(
        "build",
        &[
            ("script", count("script")),
            ("style", count("style")),
            ("plain", count("plain")),
        ],
    )
}

fn counter(bundle: &Bundle) -> &'static str {
    match bundle.kind() {
        BundleKind::Script => "script",
        BundleKind::Style => "style",
        BundleKind::Plain | BundleKind::DynamicFolder(_) => "plain",
    }
}

/// Build one bundle and write it; returns `(virtual path, versioned url)`.
fn write_bundle(
    collection: &BundleCollection,
    bundle: &Bundle,
    output: &Path,
) -> Result<(String, String)> {
    let response = bundle.get_bundle_response(&collection.context(bundle.path()))?;

    let target = output_path(output, bundle.path());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, response.content.as_bytes())
        .with_context(|| format!("failed to write {}", target.display()))?;

    let url = vpath::to_absolute(bundle.path(), collection.application_path());
    Ok((
        bundle.path().to_string(),
        cache::versioned_url(&url, &response.version),
    ))
}

/// Map `~/a/b` to `<output>/a/b`.
fn output_path(output: &Path, virtual_path: &str) -> PathBuf {
    let relative = virtual_path
        .strip_prefix(vpath::ROOT)
        .unwrap_or(virtual_path)
        .trim_start_matches('/');
    relative
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "..")
        .fold(output.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::PhysicalFileProvider;
    use tempfile::TempDir;

    fn project() -> (TempDir, BundleCollection) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("wwwroot");
        fs::create_dir_all(root.join("js")).unwrap();
        fs::write(root.join("js/a.js"), "1").unwrap();
        fs::write(root.join("js/b.js"), "2").unwrap();

        let mut collection = BundleCollection::new(Arc::new(PhysicalFileProvider::new(&root)));
        collection.set_enable_optimizations(false);
        let mut bundle = Bundle::new("~/bundles/site.js").unwrap();
        bundle.include("~/js/*.js").unwrap();
        collection.add(bundle);
        (dir, collection)
    }

    #[test]
    fn test_output_path() {
        let out = Path::new("/out");
        assert_eq!(output_path(out, "~/bundles/site"), Path::new("/out/bundles/site"));
        assert_eq!(output_path(out, "~/../x"), Path::new("/out/x"));
    }

    #[test]
    fn test_build_all_writes_bundles() {
        let (dir, collection) = project();
        let mut config = SheafConfig::default();
        config.build.output = dir.path().join("dist");

        build_all(&config, &collection).unwrap();

        let written = fs::read_to_string(dir.path().join("dist/bundles/site.js")).unwrap();
        assert_eq!(written, "1\r\n2\r\n");
    }

    #[test]
    fn test_build_all_reports_missing_files() {
        let (dir, mut collection) = project();
        let mut broken = Bundle::new("~/bundles/broken").unwrap();
        broken.include("~/js/missing.js").unwrap();
        collection.add(broken);

        let mut config = SheafConfig::default();
        config.build.output = dir.path().join("dist");
        assert!(build_all(&config, &collection).is_err());
    }
}
