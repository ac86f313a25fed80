//! Whole-file reads, atomic whole-file writes, and in-place region patches.
//!
//! Every error carries the path it happened on. File handles are scoped to
//! the helper that opens them.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::{Result, SegyError};

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| SegyError::io(path, e))
}

/// Read at most `len` bytes from the start of a file.
pub fn read_prefix(path: &Path, len: usize) -> Result<Vec<u8>> {
    let file = fs::File::open(path).map_err(|e| SegyError::io(path, e))?;
    let mut buf = Vec::with_capacity(len);
    file.take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| SegyError::io(path, e))?;
    Ok(buf)
}

pub fn file_len(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| SegyError::io(path, e))
}

/// Write `bytes` to a sibling `.tmp` file, sync it, then rename it over
/// `path`. The target is either fully replaced or left as it was.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = append_ext(path, ".tmp");
    let result = write_synced(&tmp, bytes).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| SegyError::io(path, e))
    });
    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            log::warn!("could not remove {}: {e}", tmp.display());
        }
    }
    result?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fsync_dir(parent)?;
    }
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Overwrite byte regions of an existing file in place.
///
/// The file length must already cover every region; callers validate the
/// target layout before patching so a mismatch never writes anything.
pub fn patch_regions(path: &Path, regions: &[(u64, &[u8])]) -> Result<()> {
    let len = file_len(path)?;
    for &(offset, bytes) in regions {
        let end = offset + bytes.len() as u64;
        if end > len {
            return Err(SegyError::Layout(format!(
                "region {offset}..{end} lies past the end of {} ({len} bytes)",
                path.display()
            )));
        }
    }

    let mut file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| SegyError::io(path, e))?;
    for &(offset, bytes) in regions {
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| SegyError::io(path, e))?;
        file.write_all(bytes).map_err(|e| SegyError::io(path, e))?;
    }
    file.sync_all().map_err(|e| SegyError::io(path, e))?;
    log::debug!("patched {} regions of {}", regions.len(), path.display());
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|e| SegyError::io(path, e))?;
    file.write_all(bytes).map_err(|e| SegyError::io(path, e))?;
    file.sync_all().map_err(|e| SegyError::io(path, e))?;
    Ok(())
}

fn append_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(ext);
    PathBuf::from(s)
}

fn fsync_dir(dir: &Path) -> Result<()> {
    // Directories cannot be opened for syncing on every platform.
    if cfg!(unix) {
        let f = fs::File::open(dir).map_err(|e| SegyError::io(dir, e))?;
        f.sync_all().map_err(|e| SegyError::io(dir, e))?;
    }
    Ok(())
}
