//! Unpacks the script package into a per-invocation working directory.
//!
//! Extraction is crash-only: a failure leaves the partial directory in place
//! for inspection, and the dispatcher decides whether to roll anything back.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::errors::ActionError;
use crate::script::package::{PackageFormat, ScriptPackage};

/// Extract `package` into `<archive dir>/<uid>/`, preserving entry modes.
/// The uid keeps concurrent invocations from sharing a directory.
pub fn extract(package: &ScriptPackage, uid: &str) -> Result<PathBuf, ActionError> {
    let failed = |reason: String| ActionError::Extract {
        archive: package.path.clone(),
        reason,
    };
    let parent = package.path.parent().unwrap_or_else(|| Path::new("."));
    let workdir = parent.join(uid);
    fs::create_dir_all(&workdir).map_err(|err| failed(err.to_string()))?;

    let file = File::open(&package.path).map_err(|err| failed(err.to_string()))?;
    let unpacked = match package.format {
        PackageFormat::Tar => unpack(Archive::new(file), &workdir),
        PackageFormat::TarGz => unpack(Archive::new(GzDecoder::new(file)), &workdir),
        PackageFormat::Raw => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not an archive",
        )),
    };
    unpacked.map_err(|err| failed(err.to_string()))?;
    tracing::info!(archive = %package.path.display(), workdir = %workdir.display(), "script package extracted");
    Ok(workdir)
}

fn unpack<R: Read>(mut archive: Archive<R>, workdir: &Path) -> io::Result<()> {
    archive.set_preserve_permissions(true);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let relative = entry.path()?.to_path_buf();
        let destination = entry_destination(workdir, &relative)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        entry.unpack(&destination)?;
    }
    Ok(())
}

/// Joins an archive entry path under the working directory, rejecting
/// absolute entries and parent traversal.
fn entry_destination(workdir: &Path, entry_path: &Path) -> io::Result<PathBuf> {
    let unsafe_entry = entry_path.is_absolute()
        || entry_path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
    if unsafe_entry {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsafe entry path {}", entry_path.display()),
        ));
    }
    Ok(workdir.join(entry_path))
}
