//! The vendoring pipeline
//!
//! An explicit ordered composition of result-typed steps: resolve native
//! libraries once, then per package acquire source and build, then aggregate
//! everything into the platform-keyed archive. Any non-success result
//! short-circuits the remaining steps; nothing is retried and no partial
//! archive is produced.

use std::path::{Path, PathBuf};

use crate::builder::{self, BuiltArtifact};
use crate::context::ResolvedContext;
use crate::error::{Result, VendorError};
use crate::lock::WorkDirLock;
use crate::manifest::{PackageRecord, VendorManifest};
use crate::progress::{ProgressDisplay, Stage};
use crate::source;
use crate::stage;
use crate::workdir::WorkDir;

/// Options for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Restrict the run to these package names (empty = all)
    pub only: Vec<String>,

    /// Stop after builds; do not stage or pack
    pub skip_aggregate: bool,

    /// Show a progress bar
    pub progress: bool,
}

/// Outcome of a successful run
#[derive(Debug)]
pub struct RunReport {
    /// Artifacts built (or re-verified) this run, in manifest order
    pub artifacts: Vec<BuiltArtifact>,

    /// Archive path, when aggregation ran
    pub archive: Option<PathBuf>,
}

/// Run the pipeline for a manifest
///
/// Holds the work directory lock for the whole run; `manifest_dir` anchors
/// relative paths in the manifest (descriptor template).
pub fn run(
    manifest: &VendorManifest,
    work: &WorkDir,
    manifest_dir: &Path,
    options: &RunOptions,
) -> Result<RunReport> {
    let selected = select_packages(manifest, &options.only)?;

    work.ensure_layout()?;
    let _lock = WorkDirLock::acquire(&work.lock_path(), "vendor")?;

    // All native libraries resolve before any package work starts
    let ctx = ResolvedContext::resolve(manifest)?;

    let progress = options
        .progress
        .then(|| ProgressDisplay::new(selected.len() as u64));

    let mut artifacts = Vec::with_capacity(selected.len());
    for package in &selected {
        let result = vendor_package(package, manifest, &ctx, work, progress.as_ref());
        match result {
            Ok(artifact) => {
                if let Some(pb) = &progress {
                    pb.package_done();
                }
                artifacts.push(artifact);
            }
            Err(e) => {
                if let Some(pb) = &progress {
                    pb.abandon();
                }
                return Err(e);
            }
        }
    }

    // Aggregation only covers full runs; a partial selection would bake an
    // incomplete archive
    let full_run = selected.len() == manifest.packages.len();
    let archive = if options.skip_aggregate || !full_run {
        None
    } else {
        Some(stage::aggregate(manifest, &ctx, &artifacts, work, manifest_dir)?)
    };

    if let Some(pb) = &progress {
        pb.finish(match &archive {
            Some(_) => "archive ready",
            None => "builds complete",
        });
    }

    Ok(RunReport { artifacts, archive })
}

/// Acquire and build one package
fn vendor_package(
    package: &PackageRecord,
    manifest: &VendorManifest,
    ctx: &ResolvedContext,
    work: &WorkDir,
    progress: Option<&ProgressDisplay>,
) -> Result<BuiltArtifact> {
    if let Some(pb) = progress {
        pb.update(&package.name, Stage::Acquire);
    }
    let source_dir = source::acquire(package, work)?;

    if let Some(pb) = progress {
        pb.update(&package.name, Stage::Build);
    }
    builder::build(package, &source_dir, manifest, ctx, work)
}

/// Resolve `--only` names against the manifest, preserving manifest order
fn select_packages<'a>(
    manifest: &'a VendorManifest,
    only: &[String],
) -> Result<Vec<&'a PackageRecord>> {
    if only.is_empty() {
        return Ok(manifest.packages.iter().collect());
    }

    for name in only {
        if manifest.find_package(name).is_none() {
            return Err(VendorError::UnknownPackage { name: name.clone() });
        }
    }

    Ok(manifest
        .packages
        .iter()
        .filter(|p| only.iter().any(|name| name == &p.name))
        .collect())
}
