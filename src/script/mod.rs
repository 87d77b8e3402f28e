//! Script-execution experiment: run a packaged user script under transcript
//! recording, and guarantee the target file system is restored on destroy.
//!
//! Create sequences preflight, package resolution, backup, extraction, entry
//! selection, recorded execution and transcript delivery; destroy restores
//! the backed-up original and nothing else. Any create-path failure triggers
//! a best-effort restore whose own outcome is logged but never masks the
//! original error.

mod archive;
mod backup;
mod entry;
mod package;
mod record;
mod sink;

pub use record::FILE_ARGS_DELIMITER;

use serde_json::json;

use crate::channel::{preflight, Channel};
use crate::cli::ScriptExecuteArgs;
use crate::errors::ActionError;
use crate::invocation::Invocation;
use crate::response::ExperimentResult;
use crate::script::package::ScriptPackage;
use crate::script::record::RecordingSession;
use crate::script::sink::DeliveryTarget;

const REQUIRED_COMMANDS: &[&str] = &["cat", "rm", "sed", "awk", "tar"];

pub fn create(
    invocation: &Invocation,
    args: &ScriptExecuteArgs,
    channel: &dyn Channel,
) -> Result<ExperimentResult, ActionError> {
    preflight(channel, REQUIRED_COMMANDS)?;
    let target = DeliveryTarget::from_flags(args);
    let package = package::resolve(channel, args.file.as_deref(), args.download_url.as_deref())?;
    match inject(invocation, args, channel, &package, &target) {
        Ok(result) => Ok(result),
        Err(err) => {
            // The fault may be partially applied; roll back what we can and
            // report the step that failed.
            if let Err(restore_err) = backup::restore(&package.path) {
                tracing::warn!(error = %restore_err, "cleanup restore failed");
            }
            Err(err)
        }
    }
}

fn inject(
    invocation: &Invocation,
    args: &ScriptExecuteArgs,
    channel: &dyn Channel,
    package: &ScriptPackage,
    target: &DeliveryTarget,
) -> Result<ExperimentResult, ActionError> {
    let record = backup::backup(&package.path)?;
    tracing::debug!(backup = %record.backup.display(), "original snapshotted");

    let entry = if package.format.is_archive() {
        let workdir = archive::extract(package, &invocation.uid)?;
        entry::select(&workdir, args.recover)?
    } else {
        entry::for_file(&package.path)?
    };

    let session = RecordingSession::for_uid(&invocation.uid);
    let file_args = record::split_file_args(args.file_args.as_deref());
    let outcome = record::run(channel, &entry, &file_args, &session);
    Ok(sink::deliver(&outcome, &session, target, &invocation.uid))
}

pub fn destroy(
    invocation: &Invocation,
    args: &ScriptExecuteArgs,
    channel: &dyn Channel,
) -> Result<ExperimentResult, ActionError> {
    preflight(channel, REQUIRED_COMMANDS)?;
    let path = package::destroy_path(args.file.as_deref(), args.download_url.as_deref())?;
    backup::restore(&path)?;
    Ok(ExperimentResult::ok(json!({ "uid": invocation.uid })))
}
