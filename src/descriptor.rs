//! Environment descriptor rendering
//!
//! The descriptor is produced by `@KEY@` template substitution from a fixed
//! set of discovered values: host platform, package versions, located
//! library paths, and artifact receipts. An unknown `@KEY@` is an error
//! rather than passing through silently, so stale templates fail loudly.

use std::collections::BTreeMap;

use crate::builder::BuiltArtifact;
use crate::context::ResolvedContext;
use crate::error::{Result, VendorError};
use crate::manifest::VendorManifest;

/// Build the substitution map for a run
///
/// Keys are upper-cased with `-` mapped to `_`:
/// `PLATFORM`, `GENERATOR`, `<PKG>_VERSION`, `<PKG>_ARTIFACT`, `<PKG>_SHA`,
/// `<NATIVE>_PREFIX`, `<NATIVE>_VERSION`.
pub fn substitution_map(
    manifest: &VendorManifest,
    ctx: &ResolvedContext,
    artifacts: &[BuiltArtifact],
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert("PLATFORM".to_string(), ctx.platform.clone());
    map.insert(
        "GENERATOR".to_string(),
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    );

    for package in &manifest.packages {
        map.insert(
            format!("{}_VERSION", key_name(&package.name)),
            package.version.clone(),
        );
    }

    for artifact in artifacts {
        let key = key_name(&artifact.package);
        let file_name = artifact
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        map.insert(format!("{key}_ARTIFACT"), file_name);
        map.insert(format!("{key}_SHA"), artifact.checksum.clone());
    }

    for library in ctx.libraries() {
        let key = key_name(&library.name);
        map.insert(format!("{key}_PREFIX"), library.prefix.display().to_string());
        map.insert(format!("{key}_VERSION"), library.version.clone());
    }

    map
}

/// Render a template, replacing every `@KEY@` from the map
pub fn render(template: &str, map: &BTreeMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('@') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('@') else {
            // A lone @ with no closing marker passes through
            result.push_str(&rest[open..]);
            return Ok(result);
        };

        let key = &after[..close];
        if key.is_empty() {
            // "@@" renders a literal @
            result.push('@');
        } else {
            match map.get(key) {
                Some(value) => result.push_str(value),
                None => {
                    return Err(VendorError::DescriptorRenderFailed {
                        reason: format!("unknown template key '@{key}@'"),
                    });
                }
            }
        }
        rest = &after[close + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Manifest name to descriptor key: upper-case, `-` to `_`
fn key_name(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}
