//! Source acquisition
//!
//! Each package's source arrives either as a fixed-URL archive (downloaded,
//! checksum-verified, extracted) or as a git checkout at a pinned reference.
//! Acquisition is idempotent: a source directory that already exists is
//! reused, which keeps re-runs off the network entirely.

pub mod archive;
pub mod git;

use std::path::PathBuf;

use crate::error::Result;
use crate::manifest::{PackageRecord, SourceSpec};
use crate::workdir::WorkDir;

/// Acquire a package's source, returning its source directory
///
/// Acquisition works in a `.partial` sibling directory and renames it into
/// place only once the whole checkout/extraction succeeded, so a failed
/// acquisition never masquerades as a pinned source on the next run.
pub fn acquire(package: &PackageRecord, work: &WorkDir) -> Result<PathBuf> {
    let source_dir = work.source_dir(package);

    // Sources are pinned, so an existing checkout/extraction is current
    if source_dir.is_dir() {
        return Ok(source_dir);
    }

    std::fs::create_dir_all(work.sources_dir())?;
    let partial = work
        .sources_dir()
        .join(format!(".{}.partial", package.source_dir_name()));
    if partial.exists() {
        std::fs::remove_dir_all(&partial)?;
    }

    let acquired = match &package.source {
        SourceSpec::Archive { url, sha256 } => archive::download(url, sha256, &work.cache_dir())
            .and_then(|archive_path| archive::extract(&archive_path, &partial, &package.name)),
        SourceSpec::Git { url, git_ref } => git::checkout(url, git_ref, &partial),
    };

    if let Err(e) = acquired {
        let _ = std::fs::remove_dir_all(&partial);
        return Err(e);
    }

    std::fs::rename(&partial, &source_dir)?;
    Ok(source_dir)
}
