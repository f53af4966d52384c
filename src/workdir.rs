//! Work directory layout
//!
//! All pipeline state lives under one work directory (`.provender/` next to
//! the manifest by default):
//!
//! ```text
//! .provender/
//! ├── cache/      # downloaded source archives, keyed by sha256
//! ├── src/        # acquired package sources, one dir per package-version
//! ├── out/        # per-package build output directories
//! ├── staging/    # aggregate staging layout, rebuilt on every run
//! ├── dist/       # final platform-keyed archive
//! └── .lock       # mutual exclusion for concurrent runs
//! ```

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::manifest::PackageRecord;

/// Default work directory name, relative to the manifest
pub const WORK_DIR: &str = ".provender";

/// Resolved work directory paths
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Wrap an existing or to-be-created work directory root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the full directory layout on disk
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            self.cache_dir(),
            self.sources_dir(),
            self.outputs_dir(),
            self.dist_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Downloaded source archives, keyed by sha256
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Acquired package sources
    pub fn sources_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Per-package build output directories
    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join("out")
    }

    /// Aggregate staging layout (rebuilt on every run)
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("staging")
    }

    /// Final archive location
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join("dist")
    }

    /// Lock file guarding the shared staging directory
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    /// Source directory for one package
    pub fn source_dir(&self, package: &PackageRecord) -> PathBuf {
        self.sources_dir().join(package.source_dir_name())
    }

    /// Build output directory for one package
    pub fn output_dir(&self, package: &PackageRecord) -> PathBuf {
        self.outputs_dir().join(&package.name)
    }
}
