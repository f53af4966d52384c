//! Package records: one declared third-party package per record
//!
//! A record pins the version, says where the source comes from (fixed-URL
//! archive or git checkout), which native libraries the build links against,
//! and how to invoke the external build tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One declared package to vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package name (unique within the manifest)
    pub name: String,

    /// Pinned version
    pub version: String,

    /// Where the source comes from
    ///
    /// Declared as a single-key map (`archive: {...}` or `git: {...}`);
    /// `singleton_map` bridges that to the externally tagged enum.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub source: SourceSpec,

    /// Names of declared native libraries this package builds against
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub natives: Vec<String>,

    /// External build tool invocation
    pub build: BuildSpec,

    /// Glob matched against the package's output directory; must match
    /// exactly one file
    pub artifact: String,
}

impl PackageRecord {
    /// Directory name used for this package's source checkout/extraction
    pub fn source_dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// Source locator for a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    /// Fixed-URL tarball download, verified against a pinned sha256
    Archive { url: String, sha256: String },

    /// Version-control checkout at a pinned reference
    Git {
        url: String,
        #[serde(rename = "ref")]
        git_ref: String,
    },
}

impl SourceSpec {
    /// Human-readable one-line description for listings
    pub fn describe(&self) -> String {
        match self {
            SourceSpec::Archive { url, .. } => format!("archive {url}"),
            SourceSpec::Git { url, git_ref } => format!("git {url} @ {git_ref}"),
        }
    }
}

/// External build tool invocation template
///
/// `command` and `env` values may contain `{placeholder}` references that are
/// substituted against the resolved context before invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Program and arguments; first element is the executable
    pub command: Vec<String>,

    /// Extra environment variables for the build step. Merged over the
    /// ambient process environment, so compiler selection variables such as
    /// CC and CXX pass through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_source_parses() {
        let yaml = r#"
name: geo-bundle
version: "3.6.2"
source:
  archive:
    url: https://example.com/geo-3.6.2.tar.gz
    sha256: deadbeef
build:
  command: ["make", "wheel"]
artifact: "*.whl"
"#;
        let record: PackageRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.name, "geo-bundle");
        assert_eq!(record.version, "3.6.2");
        assert!(matches!(record.source, SourceSpec::Archive { .. }));
        assert!(record.natives.is_empty());
    }

    #[test]
    fn test_git_source_parses() {
        let yaml = r#"
name: vcs-bindings
version: "1.14.1"
source:
  git:
    url: https://example.com/vcs-bindings.git
    ref: v1.14.1
natives: [libvcs]
build:
  command: ["python3", "-m", "build", "--wheel", "{source_dir}"]
  env:
    LIBVCS_PREFIX: "{lib:libvcs:prefix}"
artifact: "*.whl"
"#;
        let record: PackageRecord = serde_yaml::from_str(yaml).unwrap();
        match &record.source {
            SourceSpec::Git { url, git_ref } => {
                assert_eq!(url, "https://example.com/vcs-bindings.git");
                assert_eq!(git_ref, "v1.14.1");
            }
            other => panic!("Expected git source, got {other:?}"),
        }
        assert_eq!(record.natives, vec!["libvcs"]);
        assert_eq!(record.build.env.len(), 1);
    }

    #[test]
    fn test_source_dir_name() {
        let yaml = r#"
name: db-driver
version: "2.9.10"
source:
  archive:
    url: https://example.com/d.tar.gz
    sha256: "00"
build:
  command: ["true"]
artifact: "*.whl"
"#;
        let record: PackageRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.source_dir_name(), "db-driver-2.9.10");
    }

    #[test]
    fn test_source_describe() {
        let archive = SourceSpec::Archive {
            url: "https://example.com/a.tar.gz".to_string(),
            sha256: "00".to_string(),
        };
        assert!(archive.describe().starts_with("archive "));

        let git = SourceSpec::Git {
            url: "https://example.com/r.git".to_string(),
            git_ref: "v1.0.0".to_string(),
        };
        assert_eq!(git.describe(), "git https://example.com/r.git @ v1.0.0");
    }
}
