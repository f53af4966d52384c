//! Checksum utilities
//!
//! Upstream source archives are pinned with SHA-256 (the digest upstream
//! projects publish); built artifacts are receipted with BLAKE3.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, VendorError};

/// Hash prefix for BLAKE3 artifact receipts
pub const BLAKE3_PREFIX: &str = "blake3:";

/// Lower-case hex SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    read_into(path, |chunk| hasher.update(chunk))?;
    Ok(hex::encode(hasher.finalize()))
}

/// BLAKE3 receipt of a file, `blake3:`-prefixed
pub fn blake3_file(path: &Path) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    read_into(path, |chunk| {
        hasher.update(chunk);
    })?;
    Ok(format!("{}{}", BLAKE3_PREFIX, hasher.finalize().to_hex()))
}

fn read_into(path: &Path, mut update: impl FnMut(&[u8])) -> Result<()> {
    let file = File::open(path).map_err(|e| VendorError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| VendorError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if bytes_read == 0 {
            break;
        }

        update(&buffer[..bytes_read]);
    }

    Ok(())
}

/// Case-insensitive checksum comparison
pub fn checksums_match(expected: &str, actual: &str) -> bool {
    expected.eq_ignore_ascii_case(actual)
}
