//! Resolution of the script source into a local, verified artifact.
//!
//! Host mode supplies a download url (the local path, when also given, only
//! names the destination file); cluster mode supplies a path already present
//! on the target. Either way the resolved artifact is checked for existence
//! through the channel before any mutation happens.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::channel::Channel;
use crate::errors::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// A bare executable script, run in place.
    Raw,
    Tar,
    TarGz,
}

impl PackageFormat {
    pub fn for_path(path: &Path) -> Self {
        let name = path.to_string_lossy();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Self::TarGz
        } else if name.ends_with(".tar") {
            Self::Tar
        } else {
            Self::Raw
        }
    }

    pub fn is_archive(self) -> bool {
        !matches!(self, Self::Raw)
    }
}

/// A resolved, locally addressable script artifact. Read-only once created.
#[derive(Debug, Clone)]
pub struct ScriptPackage {
    pub path: PathBuf,
    pub format: PackageFormat,
}

pub fn resolve(
    channel: &dyn Channel,
    file: Option<&Path>,
    download_url: Option<&str>,
) -> Result<ScriptPackage, ActionError> {
    let path = match download_url {
        Some(url) => {
            let destination = download_destination(file);
            download(url, &destination)?;
            tracing::info!(url, destination = %destination.display(), "script package downloaded");
            destination
        }
        None => match file {
            Some(path) => path.to_path_buf(),
            None => return Err(ActionError::MissingParameter("file")),
        },
    };
    if !channel.file_exists(&path) {
        return Err(ActionError::FileNotFound(path));
    }
    let format = PackageFormat::for_path(&path);
    Ok(ScriptPackage { path, format })
}

/// Path the destroy branch should restore, derived with the same naming rules
/// as `resolve` but without re-downloading: restore only needs the location.
pub fn destroy_path(
    file: Option<&Path>,
    download_url: Option<&str>,
) -> Result<PathBuf, ActionError> {
    match (download_url, file) {
        (Some(_), hint) => Ok(download_destination(hint)),
        (None, Some(path)) => Ok(path.to_path_buf()),
        (None, None) => Err(ActionError::MissingParameter("file")),
    }
}

fn download_destination(hint: Option<&Path>) -> PathBuf {
    let dir = std::env::temp_dir();
    match hint.and_then(|path| path.file_name()) {
        Some(name) => dir.join(name),
        None => dir.join(format!("{}.tar", nanos_since_epoch())),
    }
}

fn nanos_since_epoch() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default()
}

fn download(url: &str, destination: &Path) -> Result<(), ActionError> {
    let transport = |err: ureq::Error| ActionError::Download {
        url: url.to_string(),
        reason: err.to_string(),
    };
    let write = |err: io::Error| ActionError::Download {
        url: url.to_string(),
        reason: format!("write {}: {err}", destination.display()),
    };
    let mut response = ureq::get(url).call().map_err(transport)?;
    let mut file = fs::File::create(destination).map_err(write)?;
    let mut body = response.body_mut().as_reader();
    io::copy(&mut body, &mut file).map_err(write)?;
    Ok(())
}
