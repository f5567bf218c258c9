//! Descriptor backups
//!
//! A backup is a plain copy of the original file next to it, named
//! `<file>.slbak`. Backups are overwritten on every run and never deleted.

use crate::error::BackupError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to the original file name
pub const BACKUP_SUFFIX: &str = ".slbak";

/// Where a copy went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub original: PathBuf,
    pub backup: PathBuf,
    pub bytes: u64,
}

/// Backup location for `path`
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Copy `path` to its backup location, replacing any older backup
///
/// # Errors
/// Returns [`BackupError::Copy`] if the copy fails
pub fn backup(path: &Path) -> Result<BackupRecord, BackupError> {
    let target = backup_path(path);
    let bytes = copy(path, &target)?;
    debug!(path = %path.display(), backup = %target.display(), bytes, "backup written");
    Ok(BackupRecord {
        original: path.to_path_buf(),
        backup: target,
        bytes,
    })
}

/// Copy the backup of `path` back over it
///
/// The backup itself is kept.
///
/// # Errors
/// Returns [`BackupError::Missing`] if there is no backup and
/// [`BackupError::Copy`] if the copy fails
pub fn restore(path: &Path) -> Result<BackupRecord, BackupError> {
    let source = backup_path(path);
    if !source.is_file() {
        return Err(BackupError::Missing(source));
    }
    let bytes = copy(&source, path)?;
    debug!(path = %path.display(), backup = %source.display(), bytes, "backup restored");
    Ok(BackupRecord {
        original: path.to_path_buf(),
        backup: source,
        bytes,
    })
}

fn copy(from: &Path, to: &Path) -> Result<u64, BackupError> {
    std::fs::copy(from, to).map_err(|source| BackupError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
