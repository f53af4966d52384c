//! Common test utilities for Provender integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A test project directory holding a manifest, a descriptor template, and
/// pre-seeded package sources so runs never touch the network
#[allow(dead_code)]
pub struct TestProject {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to project root (manifest directory)
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestProject {
    /// Create a new empty test project
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the project, creating parent directories
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the project
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in the project
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write the manifest and the descriptor template it references
    pub fn write_manifest(&self, manifest_yaml: &str) {
        self.write_file("provender.yaml", manifest_yaml);
        if !self.file_exists("vendor.env.in") {
            self.write_file(
                "vendor.env.in",
                "PLATFORM=@PLATFORM@\nGENERATOR=@GENERATOR@\n",
            );
        }
    }

    /// Pre-seed a package source directory so acquisition is a no-op
    pub fn seed_source(&self, name: &str, version: &str) {
        let dir = format!(".provender/src/{name}-{version}");
        self.write_file(&format!("{dir}/setup.py"), "# fixture source\n");
    }

    /// List the entries of a produced tar.gz archive
    pub fn archive_entries(&self, archive: &str) -> Vec<String> {
        use std::io::Read;

        let file = std::fs::File::open(self.path.join(archive)).expect("Failed to open archive");
        let mut data = Vec::new();
        flate2::read::GzDecoder::new(file)
            .read_to_end(&mut data)
            .expect("Failed to decompress archive");

        let mut archive = tar::Archive::new(&data[..]);
        archive
            .entries()
            .expect("Failed to read archive entries")
            .map(|e| {
                e.expect("Failed to read entry")
                    .path()
                    .expect("Entry has no path")
                    .display()
                    .to_string()
            })
            .collect()
    }

    /// The dist archive path for the host platform, relative to the project
    pub fn archive_path(&self, name: &str) -> String {
        let os = if cfg!(target_os = "macos") {
            "macos"
        } else if cfg!(target_os = "windows") {
            "windows"
        } else {
            "linux"
        };
        let arch = if cfg!(target_arch = "aarch64") {
            "arm64"
        } else {
            "x86_64"
        };
        format!(".provender/dist/{name}-{os}-{arch}.tar.gz")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// A manifest with two packages whose builds are plain shell commands
#[allow(dead_code)]
pub const TWO_PACKAGE_MANIFEST: &str = r#"
descriptor:
  template: vendor.env.in
  output: vendor.env
packages:
  - name: alpha
    version: "1.0"
    source: { git: { url: "https://unreachable.invalid/a.git", ref: v1 } }
    build:
      command: ["sh", "-c", "cp setup.py {output_dir}/alpha-1.0.whl"]
    artifact: "*.whl"
  - name: beta
    version: "2.0"
    source: { git: { url: "https://unreachable.invalid/b.git", ref: v2 } }
    build:
      command: ["sh", "-c", "cp setup.py {output_dir}/beta-2.0.whl"]
    artifact: "*.whl"
"#;
