//! Fixed-URL archive sources: download, verify, extract
//!
//! Downloads land in the work cache keyed by their pinned sha256, so a
//! verified archive is never fetched twice. Extraction strips a single
//! top-level directory when the tarball has one (the common upstream
//! layout).

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{Result, VendorError};
use crate::hash;

/// Download an archive and verify it against the pinned sha256
///
/// Returns the cached archive path. A cache hit skips the network; a
/// checksum mismatch removes the downloaded file so a later run can retry.
pub fn download(url: &str, sha256: &str, cache_dir: &Path) -> Result<PathBuf> {
    let cached = cache_dir.join(format!("{}.tar.gz", sha256.to_ascii_lowercase()));
    if cached.is_file() {
        return Ok(cached);
    }

    std::fs::create_dir_all(cache_dir)?;

    let response = reqwest::blocking::get(url).map_err(|e| VendorError::FetchFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(VendorError::FetchFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body = response.bytes().map_err(|e| VendorError::FetchFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    // Write then verify; partial downloads never land at the cached path
    let partial = cache_dir.join(format!(".{}.partial", sha256.to_ascii_lowercase()));
    std::fs::write(&partial, &body).map_err(|e| VendorError::FileWriteFailed {
        path: partial.display().to_string(),
        reason: e.to_string(),
    })?;

    let actual = hash::sha256_file(&partial)?;
    if !hash::checksums_match(sha256, &actual) {
        let _ = std::fs::remove_file(&partial);
        return Err(VendorError::ChecksumMismatch {
            url: url.to_string(),
            expected: sha256.to_string(),
            actual,
        });
    }

    std::fs::rename(&partial, &cached)?;
    Ok(cached)
}

/// Extract a gzip-compressed tarball into `dest`
///
/// When every entry lives under one shared top-level directory, that
/// directory is stripped so `dest` holds the source tree directly.
pub fn extract(archive_path: &Path, dest: &Path, package: &str) -> Result<()> {
    let file = std::fs::File::open(archive_path).map_err(|e| VendorError::FileReadFailed {
        path: archive_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut tar_data = Vec::new();
    GzDecoder::new(file)
        .read_to_end(&mut tar_data)
        .map_err(|e| VendorError::ExtractFailed {
            package: package.to_string(),
            reason: format!("invalid gzip data: {e}"),
        })?;

    let strip_root = shared_root(&tar_data, package)?;

    std::fs::create_dir_all(dest)?;
    let mut archive = tar::Archive::new(&tar_data[..]);
    for entry in archive.entries().map_err(extract_err(package))? {
        let mut entry = entry.map_err(extract_err(package))?;
        let path = entry.path().map_err(extract_err(package))?.into_owned();

        let relative: PathBuf = match &strip_root {
            Some(root) => match path.strip_prefix(root) {
                Ok(stripped) if stripped.as_os_str().is_empty() => continue,
                Ok(stripped) => stripped.to_path_buf(),
                Err(_) => path,
            },
            None => path,
        };

        // Entry names must stay inside the destination
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(VendorError::ExtractFailed {
                package: package.to_string(),
                reason: format!("entry path escapes destination: {}", relative.display()),
            });
        }

        entry
            .unpack(dest.join(relative))
            .map_err(extract_err(package))?;
    }

    Ok(())
}

/// First path component shared by every entry, if there is one
fn shared_root(tar_data: &[u8], package: &str) -> Result<Option<PathBuf>> {
    let mut archive = tar::Archive::new(tar_data);
    let mut root: Option<PathBuf> = None;

    for entry in archive.entries().map_err(extract_err(package))? {
        let entry = entry.map_err(extract_err(package))?;
        let path = entry.path().map_err(extract_err(package))?;
        let first = match path.components().next() {
            Some(component) => PathBuf::from(component.as_os_str()),
            None => return Ok(None),
        };

        match &root {
            None => root = Some(first),
            Some(existing) if *existing == first => {}
            Some(_) => return Ok(None),
        }
    }

    Ok(root)
}

fn extract_err(package: &str) -> impl Fn(std::io::Error) -> VendorError + '_ {
    move |e| VendorError::ExtractFailed {
        package: package.to_string(),
        reason: e.to_string(),
    }
}
