//! Resolved pipeline context
//!
//! Everything discovered before package work starts: located native
//! libraries and the host platform tag. Computed once at the top of a run
//! and passed explicitly into every later step; no step reads ambient
//! global state.

use std::collections::BTreeMap;

use crate::error::{Result, VendorError};
use crate::locate::{self, LocatedLibrary};
use crate::manifest::VendorManifest;
use crate::platform;

/// Context computed once per pipeline run
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    /// Located native libraries, keyed by manifest name
    libraries: BTreeMap<String, LocatedLibrary>,

    /// Host platform tag (`linux-x86_64`, `macos-arm64`, ...)
    pub platform: String,
}

impl ResolvedContext {
    /// Probe every native library the manifest declares
    ///
    /// Fails fast on the first library that is absent or below its version
    /// floor; no package work starts in that case.
    pub fn resolve(manifest: &VendorManifest) -> Result<Self> {
        let mut libraries = BTreeMap::new();
        for spec in &manifest.natives {
            let located = locate::locate(spec)?;
            libraries.insert(spec.name.clone(), located);
        }

        Ok(Self {
            libraries,
            platform: platform::host_tag(),
        })
    }

    /// Context with no native libraries (manifests that declare none)
    pub fn empty() -> Self {
        Self {
            libraries: BTreeMap::new(),
            platform: platform::host_tag(),
        }
    }

    /// Look up a located library by manifest name
    pub fn library(&self, name: &str) -> Result<&LocatedLibrary> {
        self.libraries
            .get(name)
            .ok_or_else(|| VendorError::ManifestInvalid {
                message: format!("native library '{name}' was not resolved"),
            })
    }

    /// All located libraries, in name order
    pub fn libraries(&self) -> impl Iterator<Item = &LocatedLibrary> {
        self.libraries.values()
    }

    #[cfg(test)]
    pub fn with_library(mut self, library: LocatedLibrary) -> Self {
        self.libraries.insert(library.name.clone(), library);
        self
    }
}
