//! Artifact builds: external tool invocation with computed arguments
//!
//! The build command and environment come from the manifest as templates;
//! `{placeholder}` references are substituted against the resolved context
//! before the tool runs. Any non-zero exit is fatal and never retried; the
//! error carries the tail of the tool's stderr so its own diagnostics
//! surface to the user.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::context::ResolvedContext;
use crate::error::{Result, VendorError};
use crate::hash;
use crate::manifest::{PackageRecord, VendorManifest};
use crate::workdir::WorkDir;

/// How many trailing stderr lines a build failure carries
const STDERR_TAIL_LINES: usize = 20;

/// One built, installable unit produced for a vendored package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    /// Package name
    pub package: String,

    /// Pinned version
    pub version: String,

    /// Artifact file path under the work directory
    pub path: PathBuf,

    /// BLAKE3 receipt, recorded for the descriptor
    pub checksum: String,
}

/// Build one package's artifact
pub fn build(
    package: &PackageRecord,
    source_dir: &Path,
    manifest: &VendorManifest,
    ctx: &ResolvedContext,
    work: &WorkDir,
) -> Result<BuiltArtifact> {
    let output_dir = work.output_dir(package);
    std::fs::create_dir_all(&output_dir)?;

    let vars = placeholder_map(package, source_dir, &output_dir, manifest, ctx)?;

    let command: Vec<String> = package
        .build
        .command
        .iter()
        .map(|arg| substitute(arg, &vars, &package.name))
        .collect::<Result<_>>()?;

    let mut env = BTreeMap::new();
    for (key, value) in &package.build.env {
        env.insert(key.clone(), substitute(value, &vars, &package.name)?);
    }

    run_build_tool(&package.name, &command, &env, source_dir)?;

    let artifact_path = find_artifact(package, &output_dir)?;
    let checksum = hash::blake3_file(&artifact_path)?;

    Ok(BuiltArtifact {
        package: package.name.clone(),
        version: package.version.clone(),
        path: artifact_path,
        checksum,
    })
}

/// Locate the single file matching the package's artifact glob
pub fn find_artifact(package: &PackageRecord, output_dir: &Path) -> Result<PathBuf> {
    let glob = wax::Glob::new(&package.artifact).map_err(|e| VendorError::InvalidArtifactGlob {
        package: package.name.clone(),
        pattern: package.artifact.clone(),
        reason: e.to_string(),
    })?;

    let mut matches: Vec<PathBuf> = glob
        .walk(output_dir)
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    matches.sort();

    match matches.len() {
        0 => Err(VendorError::ArtifactMissing {
            package: package.name.clone(),
            pattern: package.artifact.clone(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(VendorError::ArtifactAmbiguous {
            package: package.name.clone(),
            pattern: package.artifact.clone(),
            count,
        }),
    }
}

/// Invoke the external build tool, treating non-zero exit as fatal
fn run_build_tool(
    package: &str,
    command: &[String],
    env: &BTreeMap<String, String>,
    cwd: &Path,
) -> Result<()> {
    let (program, args) = command.split_first().ok_or_else(|| VendorError::BuildFailed {
        package: package.to_string(),
        reason: "empty build command".to_string(),
    })?;

    // Manifest env is merged over the process env, so CC/CXX and friends
    // pass straight through to the tool
    let output = Command::new(program)
        .args(args)
        .envs(env)
        .current_dir(cwd)
        .output()
        .map_err(|e| VendorError::BuildFailed {
            package: package.to_string(),
            reason: format!("failed to start '{program}': {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VendorError::BuildFailed {
            package: package.to_string(),
            reason: format!("{}\n{}", output.status, stderr_tail(&stderr)),
        });
    }

    Ok(())
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Substitution values for one package's build templates
fn placeholder_map(
    package: &PackageRecord,
    source_dir: &Path,
    output_dir: &Path,
    manifest: &VendorManifest,
    ctx: &ResolvedContext,
) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    vars.insert("name".to_string(), package.name.clone());
    vars.insert("version".to_string(), package.version.clone());
    vars.insert("source_dir".to_string(), source_dir.display().to_string());
    vars.insert("output_dir".to_string(), output_dir.display().to_string());

    let natives = manifest.natives_for(package);

    let mut include_dirs = Vec::new();
    let mut lib_dirs = Vec::new();
    for spec in &natives {
        let library = ctx.library(&spec.name)?;
        include_dirs.push(library.include_dir.display().to_string());
        lib_dirs.push(library.lib_dir.display().to_string());

        vars.insert(
            format!("lib:{}:prefix", spec.name),
            library.prefix.display().to_string(),
        );
        vars.insert(
            format!("lib:{}:include", spec.name),
            library.include_dir.display().to_string(),
        );
        vars.insert(
            format!("lib:{}:libdir", spec.name),
            library.lib_dir.display().to_string(),
        );
        vars.insert(format!("lib:{}:version", spec.name), library.version.clone());
    }

    let separator = if cfg!(windows) { ";" } else { ":" };
    vars.insert("include_dirs".to_string(), include_dirs.join(separator));
    vars.insert("lib_dirs".to_string(), lib_dirs.join(separator));

    Ok(vars)
}

/// Replace `{placeholder}` references; unknown placeholders are an error
fn substitute(template: &str, vars: &BTreeMap<String, String>, package: &str) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // Unterminated brace passes through literally
            result.push_str(&rest[open..]);
            return Ok(result);
        };

        let key = &after[..close];
        match vars.get(key) {
            Some(value) => result.push_str(value),
            None => {
                return Err(VendorError::UnknownPlaceholder {
                    package: package.to_string(),
                    placeholder: key.to_string(),
                });
            }
        }
        rest = &after[close + 1..];
    }

    result.push_str(rest);
    Ok(result)
}
