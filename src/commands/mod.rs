//! Command implementations

pub mod clean;
pub mod completions;
pub mod list;
pub mod locate;
pub mod vendor;
pub mod version;

use std::path::PathBuf;

use crate::error::{Result, VendorError};
use crate::manifest::{MANIFEST_FILE, VendorManifest};
use crate::workdir::{WORK_DIR, WorkDir};

/// Resolved invocation environment shared by all commands
#[derive(Debug)]
pub struct Env {
    /// Directory containing the manifest; anchors relative manifest paths
    pub manifest_dir: PathBuf,

    /// Parsed and validated manifest
    pub manifest: VendorManifest,

    /// Work directory layout
    pub work: WorkDir,
}

impl Env {
    /// Resolve the manifest and work directory from CLI arguments
    pub fn resolve(manifest: Option<PathBuf>, work_dir: Option<PathBuf>) -> Result<Self> {
        let manifest_path = match manifest {
            Some(path) => path,
            None => current_dir()?.join(MANIFEST_FILE),
        };

        let manifest_dir = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or(current_dir()?);

        let manifest = VendorManifest::load(&manifest_path)?;

        let work = WorkDir::new(work_dir.unwrap_or_else(|| manifest_dir.join(WORK_DIR)));

        Ok(Self {
            manifest_dir,
            manifest,
            work,
        })
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| VendorError::IoError {
        message: format!("Failed to get current directory: {e}"),
    })
}
