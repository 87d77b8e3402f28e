//! Runs the selected entry point, wrapping shell entries in a terminal
//! recorder that captures a timing transcript and an output transcript.

use std::path::{Path, PathBuf};

use crate::channel::Channel;
use crate::script::entry::EntryPoint;

/// Delimiter joining the positional arguments inside the `file-args` flag.
/// Multi-character so plain argument text cannot collide with it.
pub const FILE_ARGS_DELIMITER: &str = "@@";

/// Companion transcript paths for one invocation. Namespaced by uid so
/// concurrent invocations never write over each other.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    pub timing_path: PathBuf,
    pub output_path: PathBuf,
}

impl RecordingSession {
    pub fn for_uid(uid: &str) -> Self {
        let dir = std::env::temp_dir();
        Self {
            timing_path: dir.join(format!("{uid}.time")),
            output_path: dir.join(format!("{uid}.out")),
        }
    }
}

/// The two dialects of the `script` recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPlatform {
    /// BSD `script`: the command and its arguments follow the output file.
    Bsd,
    /// GNU `script`: the command is passed as one string via `-c`.
    Gnu,
}

impl RecordingPlatform {
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Bsd
        } else {
            Self::Gnu
        }
    }
}

/// Outcome of the underlying run. A failure here does not abort the create
/// sequence: the sink still delivers whatever transcript exists.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub detail: String,
    pub recorded: bool,
}

pub fn run(
    channel: &dyn Channel,
    entry: &EntryPoint,
    file_args: &str,
    session: &RecordingSession,
) -> ExecutionOutcome {
    let response = if entry.record {
        let command =
            build_recording_command(&entry.path, session, file_args, RecordingPlatform::host());
        tracing::info!(command = %command, "run recorded entry point");
        channel.run(&command, "")
    } else {
        tracing::info!(entry = %entry.path.display(), args = %file_args, "run entry point directly");
        channel.run(&entry.path.display().to_string(), file_args)
    };
    if !response.success {
        tracing::warn!(detail = %response.result, "entry point exited non-zero");
    }
    ExecutionOutcome {
        success: response.success,
        detail: response.result,
        recorded: entry.record,
    }
}

/// Split the delimited `file-args` value and rejoin with single spaces.
pub fn split_file_args(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) if raw.is_empty() => String::new(),
        Some(raw) => raw
            .split(FILE_ARGS_DELIMITER)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// The one place the platform-conditional recorder syntax is built.
pub fn build_recording_command(
    entry: &Path,
    session: &RecordingSession,
    file_args: &str,
    platform: RecordingPlatform,
) -> String {
    let invocation = if file_args.is_empty() {
        entry.display().to_string()
    } else {
        format!("{} {}", entry.display(), file_args)
    };
    let timing = session.timing_path.display();
    let output = session.output_path.display();
    match platform {
        RecordingPlatform::Bsd => format!("script -t 2>{timing} -a {output} {invocation}"),
        RecordingPlatform::Gnu => format!("script -t 2>{timing} -a {output} -c \"{invocation}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RecordingSession {
        RecordingSession {
            timing_path: PathBuf::from("/tmp/u1.time"),
            output_path: PathBuf::from("/tmp/u1.out"),
        }
    }

    #[test]
    fn session_paths_are_namespaced_by_uid() {
        let session = RecordingSession::for_uid("u1");
        assert!(session.timing_path.ends_with("u1.time"));
        assert!(session.output_path.ends_with("u1.out"));
        let other = RecordingSession::for_uid("u2");
        assert_ne!(session.output_path, other.output_path);
    }

    #[test]
    fn splits_and_rejoins_delimited_arguments() {
        assert_eq!(split_file_args(Some("aaa@@bbb@@ccc")), "aaa bbb ccc");
        assert_eq!(split_file_args(Some("single")), "single");
        assert_eq!(split_file_args(Some("")), "");
        assert_eq!(split_file_args(None), "");
    }

    #[test]
    fn gnu_recorder_quotes_the_command() {
        let command = build_recording_command(
            Path::new("/work/main.sh"),
            &session(),
            "x y",
            RecordingPlatform::Gnu,
        );
        assert_eq!(
            command,
            "script -t 2>/tmp/u1.time -a /tmp/u1.out -c \"/work/main.sh x y\""
        );
    }

    #[test]
    fn bsd_recorder_appends_the_command() {
        let command = build_recording_command(
            Path::new("/work/main.sh"),
            &session(),
            "",
            RecordingPlatform::Bsd,
        );
        assert_eq!(command, "script -t 2>/tmp/u1.time -a /tmp/u1.out /work/main.sh");
    }
}
