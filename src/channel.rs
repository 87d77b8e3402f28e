//! Command execution channel shared by all experiment actions.
//!
//! The trait is the seam the orchestrator owns: a remote (ssh) transport
//! implements the same three calls. `LocalChannel` runs commands on the
//! invoking host and is the default wiring for the CLI. Command strings that
//! carry shell syntax (the recording wrapper redirects stderr) go through
//! `sh -c`; plain invocations are split with shell-words and executed
//! directly.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use crate::errors::ActionError;

#[derive(Debug, Clone)]
pub struct ChannelResponse {
    pub success: bool,
    pub result: String,
}

pub trait Channel {
    /// Execute `command` with an already-formatted argument string, returning
    /// a uniform success/result envelope. Never panics; spawn failures come
    /// back as a failed response.
    fn run(&self, command: &str, args: &str) -> ChannelResponse;

    /// Preflight check; `Err` carries the missing command names.
    fn is_all_commands_available(&self, commands: &[&str]) -> Result<(), Vec<String>>;

    fn file_exists(&self, path: &Path) -> bool;
}

/// Map a missing-commands preflight failure into the action error taxonomy.
pub fn preflight(channel: &dyn Channel, commands: &[&str]) -> Result<(), ActionError> {
    channel
        .is_all_commands_available(commands)
        .map_err(|missing| ActionError::ChannelUnavailable(missing.join(", ")))
}

pub struct LocalChannel;

impl LocalChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for LocalChannel {
    fn run(&self, command: &str, args: &str) -> ChannelResponse {
        let line = if args.is_empty() {
            command.to_string()
        } else {
            format!("{command} {args}")
        };
        let started = Instant::now();
        let output = if needs_shell(&line) {
            Command::new("sh").arg("-c").arg(&line).output()
        } else {
            match shell_words::split(&line) {
                Ok(argv) if !argv.is_empty() => {
                    let mut command = Command::new(&argv[0]);
                    command.args(&argv[1..]);
                    command.output()
                }
                _ => Command::new("sh").arg("-c").arg(&line).output(),
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match output {
            Ok(output) => {
                let success = output.status.success();
                tracing::debug!(command = %line, elapsed_ms, success, "channel command complete");
                ChannelResponse {
                    success,
                    result: merge_output(&output.stdout, &output.stderr),
                }
            }
            Err(err) => {
                tracing::debug!(command = %line, elapsed_ms, error = %err, "channel command failed to spawn");
                ChannelResponse {
                    success: false,
                    result: err.to_string(),
                }
            }
        }
    }

    fn is_all_commands_available(&self, commands: &[&str]) -> Result<(), Vec<String>> {
        let missing: Vec<String> = commands
            .iter()
            .filter(|command| which::which(*command).is_err())
            .map(|command| command.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn needs_shell(line: &str) -> bool {
    line.chars()
        .any(|ch| matches!(ch, '>' | '<' | '|' | ';' | '&' | '$' | '`' | '"'))
}

fn merge_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut result = String::from_utf8_lossy(stdout).trim_end().to_string();
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(stderr);
    }
    result
}
