//! Work directory locking
//!
//! Two pipeline runs must not write the shared staging directory at the same
//! time. A lock file created with `create_new` semantics guards the work
//! directory; it records who holds it and is removed when the guard drops.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VendorError};

/// Metadata written into the lock file
#[derive(Debug, Serialize, Deserialize)]
pub struct LockMetadata {
    pub pid: u32,
    pub command: String,
    pub started_at_unix: u64,
}

/// Held lock on a work directory; released on drop
#[derive(Debug)]
pub struct WorkDirLock {
    path: PathBuf,
}

impl WorkDirLock {
    /// Acquire the lock, failing immediately on contention
    pub fn acquire(lock_path: &Path, command: &str) -> Result<Self> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path);

        let file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(contention_error(lock_path));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = LockMetadata {
            pid: std::process::id(),
            command: command.to_string(),
            started_at_unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };
        serde_json::to_writer_pretty(&file, &metadata).map_err(|e| {
            VendorError::FileWriteFailed {
                path: lock_path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            path: lock_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDirLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Report who holds the lock, falling back to placeholders when the
/// metadata cannot be read
fn contention_error(lock_path: &Path) -> VendorError {
    let metadata = std::fs::read_to_string(lock_path)
        .ok()
        .and_then(|content| serde_json::from_str::<LockMetadata>(&content).ok());

    match metadata {
        Some(metadata) => VendorError::WorkDirLocked {
            command: metadata.command,
            pid: metadata.pid,
            lock_path: lock_path.display().to_string(),
        },
        None => VendorError::WorkDirLocked {
            command: "unknown".to_string(),
            pid: 0,
            lock_path: lock_path.display().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_creates_lock_file() {
        let temp = TempDir::new().unwrap();
        let lock_path = temp.path().join(".lock");

        let lock = WorkDirLock::acquire(&lock_path, "vendor").unwrap();
        assert!(lock.path().exists());
    }

    #[test]
    fn test_contention_reports_holder() {
        let temp = TempDir::new().unwrap();
        let lock_path = temp.path().join(".lock");

        let _held = WorkDirLock::acquire(&lock_path, "vendor").unwrap();
        let err = WorkDirLock::acquire(&lock_path, "vendor").unwrap_err();

        match err {
            VendorError::WorkDirLocked { command, pid, .. } => {
                assert_eq!(command, "vendor");
                assert_eq!(pid, std::process::id());
            }
            other => panic!("Expected contention, got {other:?}"),
        }
    }

    #[test]
    fn test_lock_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let lock_path = temp.path().join(".lock");

        {
            let _lock = WorkDirLock::acquire(&lock_path, "vendor").unwrap();
        }

        assert!(!lock_path.exists());
        let _reacquired = WorkDirLock::acquire(&lock_path, "vendor").unwrap();
    }

    #[test]
    fn test_unreadable_metadata_still_reports_contention() {
        let temp = TempDir::new().unwrap();
        let lock_path = temp.path().join(".lock");
        std::fs::write(&lock_path, "not json").unwrap();

        let err = WorkDirLock::acquire(&lock_path, "vendor").unwrap_err();
        assert!(matches!(
            err,
            VendorError::WorkDirLocked { pid: 0, .. }
        ));
    }
}
