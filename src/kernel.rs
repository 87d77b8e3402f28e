//! Kernel syscall delay via strace fault injection.
//!
//! Builds an `strace -e inject=...` expression targeting the given pids and
//! runs it through the channel. The occurrence selectors (`first`, `end`,
//! `step`) narrow which matched syscalls receive the delay.

use regex::Regex;

use crate::channel::{preflight, Channel};
use crate::cli::KernelDelayArgs;
use crate::errors::ActionError;
use crate::invocation::Invocation;
use crate::response::ExperimentResult;

/// strace accepts a bare count of seconds or a value with an s/ms/us/ns unit.
const DELAY_SPEC: &str = r"^\d+(s|ms|us|ns)?$";

pub fn delay(
    invocation: &Invocation,
    args: &KernelDelayArgs,
    channel: &dyn Channel,
) -> Result<ExperimentResult, ActionError> {
    let pids = parse_pids(&args.pid)?;
    validate_delay_spec(&args.time)?;
    let location = match args.delay_loc.as_str() {
        "enter" => "delay_enter",
        "exit" => "delay_exit",
        other => {
            return Err(ActionError::ParameterInvalid {
                name: "delay-loc",
                reason: format!("`{other}` is neither enter nor exit"),
            })
        }
    };
    preflight(channel, &["strace"])?;

    let command_args = build_strace_args(args, location, &pids);
    tracing::info!(uid = %invocation.uid, syscall = %args.syscall_name, args = %command_args, "inject syscall delay");
    Ok(ExperimentResult::from_channel(
        channel.run("strace", &command_args),
    ))
}

fn build_strace_args(args: &KernelDelayArgs, location: &str, pids: &[u32]) -> String {
    let mut inject = format!(
        "-f -e inject={}:{}={}",
        args.syscall_name, location, args.time
    );
    if let Some(first) = args.first {
        inject = format!("{inject}:when={first}");
        match (args.end, args.step) {
            (Some(end), Some(step)) => inject = format!("{inject}..{end}+{step}"),
            (Some(end), None) => inject = format!("{inject}..{end}"),
            (None, Some(step)) => inject = format!("{inject}+{step}"),
            (None, None) => {}
        }
    }
    let mut command_args = inject;
    for pid in pids {
        command_args = format!("-p {pid} {command_args}");
    }
    command_args
}

fn parse_pids(raw: &str) -> Result<Vec<u32>, ActionError> {
    let mut pids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let pid: u32 = part.parse().map_err(|_| ActionError::ParameterInvalid {
            name: "pid",
            reason: format!("`{part}` is not a process id"),
        })?;
        pids.push(pid);
    }
    if pids.is_empty() {
        return Err(ActionError::ParameterInvalid {
            name: "pid",
            reason: "no process ids given".to_string(),
        });
    }
    Ok(pids)
}

fn validate_delay_spec(value: &str) -> Result<(), ActionError> {
    let valid = Regex::new(DELAY_SPEC)
        .map(|pattern| pattern.is_match(value))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(ActionError::ParameterInvalid {
            name: "time",
            reason: format!("`{value}` is not a delay like 10s or 100ms"),
        })
    }
}
