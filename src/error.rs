//! Error types and handling for Provender
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Errors are grouped by pipeline stage: manifest loading, native library
//! location, source acquisition (archive download or git checkout), artifact
//! builds, and aggregation. Every error is fatal; the pipeline never retries.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Provender operations
#[derive(Error, Diagnostic, Debug)]
pub enum VendorError {
    // Manifest errors
    #[error("Manifest file not found: {path}")]
    #[diagnostic(
        code(provender::manifest::not_found),
        help("Create a provender.yaml in the current directory or pass --manifest <path>")
    )]
    ManifestNotFound { path: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(provender::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid manifest: {message}")]
    #[diagnostic(code(provender::manifest::invalid))]
    ManifestInvalid { message: String },

    #[error("Package '{name}' is not declared in the manifest")]
    #[diagnostic(
        code(provender::manifest::unknown_package),
        help("Run 'provender list' to see the declared packages")
    )]
    UnknownPackage { name: String },

    // Native library location errors
    #[error("Native library '{name}' not found (pkg-config module '{module}')")]
    #[diagnostic(
        code(provender::locate::not_found),
        help("Install the library so pkg-config can see it, or adjust PKG_CONFIG_PATH")
    )]
    NativeLibraryNotFound {
        name: String,
        module: String,
        reason: String,
    },

    #[error("Native library '{name}' is too old: found {found}, need at least {required}")]
    #[diagnostic(
        code(provender::locate::too_old),
        help("Upgrade the system library to meet the declared version floor")
    )]
    NativeLibraryTooOld {
        name: String,
        found: String,
        required: String,
    },

    // Archive source errors
    #[error("Failed to fetch {url}: {reason}")]
    #[diagnostic(
        code(provender::source::fetch_failed),
        help("Check the URL and your network connection, then re-run")
    )]
    FetchFailed { url: String, reason: String },

    #[error("Checksum mismatch for {url}")]
    #[diagnostic(
        code(provender::source::checksum_mismatch),
        help("The upstream archive does not match the pinned sha256; verify the pin")
    )]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to extract archive for package '{package}': {reason}")]
    #[diagnostic(code(provender::source::extract_failed))]
    ExtractFailed { package: String, reason: String },

    // Git source errors
    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(provender::git::clone_failed),
        help("Check that URL is correct and you have access to repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(provender::git::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    #[error("Failed to checkout '{git_ref}': {reason}")]
    #[diagnostic(code(provender::git::checkout_failed))]
    GitCheckoutFailed { git_ref: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(provender::git::operation_failed))]
    GitOperationFailed { message: String },

    // Build errors
    #[error("Build failed for package '{package}': {reason}")]
    #[diagnostic(
        code(provender::build::failed),
        help("The build tool's own output is shown above; fix the build and re-run")
    )]
    BuildFailed { package: String, reason: String },

    #[error("No artifact matched '{pattern}' for package '{package}'")]
    #[diagnostic(
        code(provender::build::artifact_missing),
        help("Check the package's artifact glob against what its build step writes")
    )]
    ArtifactMissing { package: String, pattern: String },

    #[error("Artifact glob '{pattern}' matched {count} files for package '{package}'")]
    #[diagnostic(
        code(provender::build::artifact_ambiguous),
        help("Each package must produce exactly one artifact; tighten the glob")
    )]
    ArtifactAmbiguous {
        package: String,
        pattern: String,
        count: usize,
    },

    #[error("Invalid artifact glob '{pattern}' for package '{package}': {reason}")]
    #[diagnostic(code(provender::build::invalid_glob))]
    InvalidArtifactGlob {
        package: String,
        pattern: String,
        reason: String,
    },

    #[error("Unknown placeholder '{{{placeholder}}}' in build spec for package '{package}'")]
    #[diagnostic(
        code(provender::build::unknown_placeholder),
        help(
            "Valid placeholders: {{name}}, {{version}}, {{source_dir}}, {{output_dir}}, \
             {{include_dirs}}, {{lib_dirs}}, {{lib:<native>:prefix|include|libdir|version}}"
        )
    )]
    UnknownPlaceholder { package: String, placeholder: String },

    // Aggregation errors
    #[error("Cannot aggregate: package '{package}' has no built artifact")]
    #[diagnostic(
        code(provender::stage::artifact_not_built),
        help("Run 'provender vendor' without --only so every declared package is built")
    )]
    ArtifactNotBuilt { package: String },

    #[error("Failed to render descriptor: {reason}")]
    #[diagnostic(code(provender::stage::descriptor_failed))]
    DescriptorRenderFailed { reason: String },

    // Work directory errors
    #[error(
        "Work directory is locked by another process: {command} (PID {pid})\n\
         If no provender process is running, remove the lock file:\n  {lock_path}"
    )]
    #[diagnostic(code(provender::lock::contended))]
    WorkDirLocked {
        command: String,
        pid: u32,
        lock_path: String,
    },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(provender::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(provender::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(provender::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for VendorError {
    fn from(err: std::io::Error) -> Self {
        VendorError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for VendorError {
    fn from(err: serde_yaml::Error) -> Self {
        VendorError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for VendorError {
    fn from(err: git2::Error) -> Self {
        VendorError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, VendorError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_display() {
        let err = VendorError::NativeLibraryNotFound {
            name: "spatialindex".to_string(),
            module: "libspatialindex".to_string(),
            reason: "probe failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Native library 'spatialindex' not found (pkg-config module 'libspatialindex')"
        );
    }

    #[test]
    fn test_error_code() {
        let err = VendorError::ManifestNotFound {
            path: "provender.yaml".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("provender::manifest::not_found".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VendorError = io_err.into();
        assert!(matches!(err, VendorError::IoError { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: yaml: content: [unclosed";
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str(yaml_str);
        let yaml_err = parse_result.unwrap_err();
        let err: VendorError = yaml_err.into();
        assert!(matches!(err, VendorError::ManifestParseFailed { .. }));
    }

    #[test]
    fn test_git_error_conversion() {
        let git_err = git2::Error::from_str("git error");
        let err: VendorError = git_err.into();
        assert!(matches!(err, VendorError::GitOperationFailed { .. }));
    }

    test_error_contains!(
        test_checksum_mismatch_error,
        VendorError::ChecksumMismatch {
            url: "https://example.com/pkg.tar.gz".to_string(),
            expected: "aaaa".to_string(),
            actual: "bbbb".to_string(),
        },
        "Checksum mismatch",
        "https://example.com/pkg.tar.gz",
    );

    test_error_contains!(
        test_too_old_error,
        VendorError::NativeLibraryTooOld {
            name: "geos".to_string(),
            found: "3.8.0".to_string(),
            required: "3.10".to_string(),
        },
        "too old",
        "3.8.0",
        "3.10",
    );

    test_error_contains!(
        test_build_failed_error,
        VendorError::BuildFailed {
            package: "sqlite-bundle".to_string(),
            reason: "exit status 2".to_string(),
        },
        "Build failed",
        "sqlite-bundle",
    );

    test_error_contains!(
        test_artifact_missing_error,
        VendorError::ArtifactMissing {
            package: "gdal-wheel".to_string(),
            pattern: "*.whl".to_string(),
        },
        "No artifact matched",
        "*.whl",
    );

    test_error_contains!(
        test_work_dir_locked_error,
        VendorError::WorkDirLocked {
            command: "vendor".to_string(),
            pid: 1234,
            lock_path: "/tmp/.provender/.lock".to_string(),
        },
        "locked by another process",
        "1234",
    );

    #[test]
    fn test_artifact_ambiguous_counts() {
        let err = VendorError::ArtifactAmbiguous {
            package: "pkg".to_string(),
            pattern: "*.whl".to_string(),
            count: 3,
        };
        assert!(err.to_string().contains("matched 3 files"));
    }
}
