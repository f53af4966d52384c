//! Native library location via pkg-config
//!
//! Each declared native library is probed once, before any package work
//! starts. `--modversion` establishes presence and version; prefix, include
//! and lib directories come from pkg-config variables, falling back to the
//! conventional `<prefix>/include` and `<prefix>/lib` when unset.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Result, VendorError};
use crate::manifest::NativeLibrarySpec;

/// Environment variable overriding the pkg-config executable (used by tests
/// and by cross-compilation wrappers)
pub const PKG_CONFIG_ENV: &str = "PROVENDER_PKG_CONFIG";

/// A system library discovered on the host
///
/// Read-only after discovery; the pipeline computes these once and passes
/// them into every later step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLibrary {
    /// Name from the manifest
    pub name: String,

    /// Install prefix
    pub prefix: PathBuf,

    /// Header directory
    pub include_dir: PathBuf,

    /// Library directory
    pub lib_dir: PathBuf,

    /// Version reported by pkg-config
    pub version: String,
}

/// Probe the host for one declared native library
pub fn locate(spec: &NativeLibrarySpec) -> Result<LocatedLibrary> {
    let version = query(&spec.pkg_config, "--modversion").map_err(|reason| {
        VendorError::NativeLibraryNotFound {
            name: spec.name.clone(),
            module: spec.pkg_config.clone(),
            reason,
        }
    })?;

    if let Some(floor) = &spec.min_version {
        if !version_at_least(&version, floor) {
            return Err(VendorError::NativeLibraryTooOld {
                name: spec.name.clone(),
                found: version,
                required: floor.clone(),
            });
        }
    }

    let prefix = query_variable(&spec.pkg_config, "prefix").unwrap_or_default();
    let prefix = PathBuf::from(prefix);

    let include_dir = query_variable(&spec.pkg_config, "includedir")
        .map(PathBuf::from)
        .unwrap_or_else(|| prefix.join("include"));
    let lib_dir = query_variable(&spec.pkg_config, "libdir")
        .map(PathBuf::from)
        .unwrap_or_else(|| prefix.join("lib"));

    Ok(LocatedLibrary {
        name: spec.name.clone(),
        prefix,
        include_dir,
        lib_dir,
        version,
    })
}

/// Name of the pkg-config executable to invoke
fn pkg_config_bin() -> String {
    std::env::var(PKG_CONFIG_ENV).unwrap_or_else(|_| "pkg-config".to_string())
}

/// Run pkg-config with one flag, returning trimmed stdout
fn query(module: &str, flag: &str) -> std::result::Result<String, String> {
    let output = Command::new(pkg_config_bin())
        .arg(flag)
        .arg(module)
        .output()
        .map_err(|e| format!("failed to run pkg-config: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        return Err(if stderr.is_empty() {
            format!("pkg-config exited with {}", output.status)
        } else {
            stderr.to_string()
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Query a pkg-config variable, treating failures and empty output as unset
fn query_variable(module: &str, variable: &str) -> Option<String> {
    match query(module, &format!("--variable={variable}")) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Lenient dot-segment version floor comparison
///
/// Missing segments count as zero; non-numeric tails within a segment are
/// ignored ("3.10.0beta2" compares as 3.10.0).
pub fn version_at_least(found: &str, floor: &str) -> bool {
    let found = parse_segments(found);
    let floor = parse_segments(floor);
    let len = found.len().max(floor.len());

    for i in 0..len {
        let f = found.get(i).copied().unwrap_or(0);
        let r = floor.get(i).copied().unwrap_or(0);
        if f != r {
            return f > r;
        }
    }
    true
}

fn parse_segments(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|segment| {
            let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}
