//! Vendor manifest (`provender.yaml`) loading and validation
//!
//! The manifest is the single input to the pipeline: declared packages with
//! pinned versions and sources, the native libraries they build against, the
//! descriptor template, and the aggregate archive settings.

pub mod package;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VendorError};

pub use package::{PackageRecord, SourceSpec};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "provender.yaml";

/// Top-level vendor manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorManifest {
    /// Aggregate archive settings
    #[serde(default)]
    pub archive: ArchiveSpec,

    /// Environment descriptor settings
    pub descriptor: DescriptorSpec,

    /// Native libraries to locate on the host before any build starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub natives: Vec<NativeLibrarySpec>,

    /// Packages to vendor
    pub packages: Vec<PackageRecord>,
}

/// Aggregate archive settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSpec {
    /// Archive base name; the final file is `<name>-<platform>.tar.gz`
    #[serde(default = "default_archive_name")]
    pub name: String,

    /// Name of the empty placeholder directory included in the layout
    #[serde(default = "default_placeholder_dir")]
    pub placeholder_dir: String,
}

fn default_archive_name() -> String {
    "vendor".to_string()
}

fn default_placeholder_dir() -> String {
    "env".to_string()
}

impl Default for ArchiveSpec {
    fn default() -> Self {
        Self {
            name: default_archive_name(),
            placeholder_dir: default_placeholder_dir(),
        }
    }
}

/// Environment descriptor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorSpec {
    /// Template file path, relative to the manifest
    pub template: PathBuf,

    /// Output file name inside the archive root
    pub output: String,
}

/// One native library to probe for via pkg-config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeLibrarySpec {
    /// Name referenced by package records
    pub name: String,

    /// pkg-config module name to probe
    pub pkg_config: String,

    /// Minimum acceptable version (version floor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
}

impl VendorManifest {
    /// Load and validate a manifest from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VendorError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| VendorError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let manifest = Self::from_yaml(&content).map_err(|e| match e {
            VendorError::ManifestParseFailed { reason, .. } => VendorError::ManifestParseFailed {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        Ok(manifest)
    }

    /// Parse and validate a manifest from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: VendorManifest =
            serde_yaml::from_str(content).map_err(|e| VendorError::ManifestParseFailed {
                path: MANIFEST_FILE.to_string(),
                reason: e.to_string(),
            })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Structural validation beyond what serde enforces
    fn validate(&self) -> Result<()> {
        if self.packages.is_empty() {
            return Err(VendorError::ManifestInvalid {
                message: "no packages declared".to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for package in &self.packages {
            if !seen.insert(package.name.as_str()) {
                return Err(VendorError::ManifestInvalid {
                    message: format!("duplicate package name '{}'", package.name),
                });
            }
            if package.build.command.is_empty() {
                return Err(VendorError::ManifestInvalid {
                    message: format!("package '{}' has an empty build command", package.name),
                });
            }
        }

        let mut native_names = BTreeSet::new();
        for native in &self.natives {
            if !native_names.insert(native.name.as_str()) {
                return Err(VendorError::ManifestInvalid {
                    message: format!("duplicate native library '{}'", native.name),
                });
            }
        }

        for package in &self.packages {
            for native in &package.natives {
                if !native_names.contains(native.as_str()) {
                    return Err(VendorError::ManifestInvalid {
                        message: format!(
                            "package '{}' references undeclared native library '{}'",
                            package.name, native
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Find a declared package by name
    pub fn find_package(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Native library specs referenced by the given package, in declaration order
    pub fn natives_for<'a>(&'a self, package: &PackageRecord) -> Vec<&'a NativeLibrarySpec> {
        self.natives
            .iter()
            .filter(|n| package.natives.iter().any(|name| name == &n.name))
            .collect()
    }
}
