//! Atomic file protocol for the settings store
//!
//! A save never leaves a half-written settings file behind: bytes go to a
//! sibling temporary file which is written, synced, and renamed over the
//! destination. The previous file is copied aside as a backup first, so a
//! primary that later turns out corrupt can be recovered at load time.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::StoreError;

const TMP_SUFFIX: &str = "tmp";
const BACKUP_SUFFIX: &str = "bak";

/// Sibling backup path: `settings.dat` becomes `settings.dat.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, BACKUP_SUFFIX)
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `data` to `path` with an atomic replace.
///
/// The bytes land in a sibling `.tmp` file which is synced to disk and then
/// renamed over the destination, so any observer sees either the old file or
/// the new one, never a partial write. An existing destination is copied to
/// the backup path before the rename; a failed backup is logged and does not
/// fail the save. The temporary file is removed on every failure path after
/// its creation.
pub fn save_file(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
        }
    }

    let tmp = sibling_with_suffix(path, TMP_SUFFIX);
    if let Err(err) = write_sync(&tmp, data) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    if path.exists() {
        let backup = backup_path(path);
        if let Err(err) = fs::copy(path, &backup) {
            warn!(
                path = %path.display(),
                backup = %backup.display(),
                error = %err,
                "failed to back up previous settings file"
            );
        }
    }

    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io("rename", path, err));
    }
    Ok(())
}

fn write_sync(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let mut file = File::create(path).map_err(|e| StoreError::io("create", path, e))?;
    file.write_all(data)
        .map_err(|e| StoreError::io("write", path, e))?;
    file.sync_all().map_err(|e| StoreError::io("sync", path, e))?;
    Ok(())
}

/// Read a whole settings file into memory.
///
/// A missing file maps to `StoreError::NotFound`; every other failure is an
/// `Io` error carrying the path and operation.
pub fn load_file(path: &Path) -> Result<Vec<u8>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(StoreError::NotFound(path.to_path_buf()))
        }
        Err(err) => Err(StoreError::io("read", path, err)),
    }
}
