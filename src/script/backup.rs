//! Snapshot of the target script before the experiment mutates it.
//!
//! The backup lives next to the original under a fixed suffix, but callers
//! never rebuild that path themselves: `backup` hands out a `BackupRecord`
//! and `restore` is the only other place the convention is applied.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ActionError;

const BACKUP_SUFFIX: &str = ".bak";

/// Pairing of an original file and its snapshot.
#[derive(Debug, Clone)]
pub struct BackupRecord {
    pub original: PathBuf,
    pub backup: PathBuf,
}

fn backup_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(BACKUP_SUFFIX);
    PathBuf::from(raw)
}

/// Copy `path` aside before it is mutated. An already-present backup is kept
/// untouched so repeated creates of the same invocation cannot clobber the
/// true original.
pub fn backup(path: &Path) -> Result<BackupRecord, ActionError> {
    let backup = backup_path(path);
    if !backup.exists() {
        fs::copy(path, &backup)
            .map_err(|err| ActionError::io(format!("back up {}", path.display()), err))?;
        tracing::debug!(original = %path.display(), backup = %backup.display(), "script backed up");
    }
    Ok(BackupRecord {
        original: path.to_path_buf(),
        backup,
    })
}

/// Put the original back and consume the snapshot. A missing backup means
/// there is nothing to undo (destroy without create) and is a success.
pub fn restore(path: &Path) -> Result<(), ActionError> {
    let backup = backup_path(path);
    if !backup.exists() {
        return Ok(());
    }
    fs::copy(&backup, path)
        .map_err(|err| ActionError::io(format!("restore {}", path.display()), err))?;
    fs::remove_file(&backup)
        .map_err(|err| ActionError::io(format!("remove backup {}", backup.display()), err))?;
    tracing::debug!(original = %path.display(), "script restored");
    Ok(())
}
