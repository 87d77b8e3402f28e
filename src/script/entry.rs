//! Entry-point selection inside an extracted package.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::errors::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Shell,
    Interpreted,
}

/// The script file actually executed. Derived data, recomputed per create.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Shell entries run under the terminal recorder; interpreted ones do not.
    pub record: bool,
}

const MAIN_CANDIDATES: &[(&str, EntryKind)] = &[
    ("main.sh", EntryKind::Shell),
    ("main.py", EntryKind::Interpreted),
    // older single-file packages shipped a bare `main`
    ("main", EntryKind::Shell),
];

const RECOVER_CANDIDATES: &[(&str, EntryKind)] = &[
    ("recover.sh", EntryKind::Shell),
    ("recover.py", EntryKind::Interpreted),
];

/// Pick the entry point for the requested mode, first match wins, and make it
/// executable. No candidate present fails with `NoEntryPoint`.
pub fn select(workdir: &Path, want_recovery: bool) -> Result<EntryPoint, ActionError> {
    let candidates = if want_recovery {
        RECOVER_CANDIDATES
    } else {
        MAIN_CANDIDATES
    };
    for (name, kind) in candidates {
        let path = workdir.join(name);
        if path.is_file() {
            return entry_at(path, *kind);
        }
    }
    Err(ActionError::NoEntryPoint(workdir.to_path_buf()))
}

/// Entry point for a raw (non-archive) package: the package file itself.
pub fn for_file(path: &Path) -> Result<EntryPoint, ActionError> {
    let kind = if path.extension().is_some_and(|ext| ext == "py") {
        EntryKind::Interpreted
    } else {
        EntryKind::Shell
    };
    entry_at(path.to_path_buf(), kind)
}

fn entry_at(path: PathBuf, kind: EntryKind) -> Result<EntryPoint, ActionError> {
    fs::set_permissions(&path, fs::Permissions::from_mode(0o777))
        .map_err(|err| ActionError::io(format!("make {} executable", path.display()), err))?;
    tracing::debug!(entry = %path.display(), ?kind, "entry point selected");
    Ok(EntryPoint {
        path,
        kind,
        record: kind == EntryKind::Shell,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"#!/bin/sh\n").expect("write entry");
    }

    #[test]
    fn prefers_main_sh_over_main_py() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(dir.path(), "main.sh");
        touch(dir.path(), "main.py");
        let entry = select(dir.path(), false).expect("select");
        assert_eq!(entry.path, dir.path().join("main.sh"));
        assert_eq!(entry.kind, EntryKind::Shell);
        assert!(entry.record);
    }

    #[test]
    fn interpreted_entries_skip_recording() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(dir.path(), "main.py");
        let entry = select(dir.path(), false).expect("select");
        assert_eq!(entry.kind, EntryKind::Interpreted);
        assert!(!entry.record);
    }

    #[test]
    fn accepts_bare_main_for_old_packages() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(dir.path(), "main");
        let entry = select(dir.path(), false).expect("select");
        assert_eq!(entry.path, dir.path().join("main"));
        assert_eq!(entry.kind, EntryKind::Shell);
    }

    #[test]
    fn recovery_mode_selects_recover_entries() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(dir.path(), "main.sh");
        touch(dir.path(), "recover.sh");
        let entry = select(dir.path(), true).expect("select");
        assert_eq!(entry.path, dir.path().join("recover.sh"));
    }

    #[test]
    fn empty_directory_has_no_entry_point() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = select(dir.path(), false).unwrap_err();
        assert!(matches!(err, ActionError::NoEntryPoint(_)));
    }

    #[test]
    fn selected_entry_becomes_executable() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(dir.path(), "main.sh");
        let entry = select(dir.path(), false).expect("select");
        let mode = fs::metadata(&entry.path)
            .expect("stat entry")
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
