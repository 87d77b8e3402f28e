//! CLI argument parsing for the experiment actions.
//!
//! Flags are typed structs validated at the dispatch boundary: each action
//! enumerates its own optional fields instead of reading a shared string map,
//! and mutually exclusive delivery targets are declared to clap rather than
//! checked ad hoc.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint: one create-or-destroy invocation per run.
#[derive(Parser, Debug)]
#[command(
    name = "fline",
    version,
    about = "Fault-injection experiment actions for chaos testing",
    after_help = "Examples:\n  fline create host-restart --time +1\n  fline create http-delay --url https://example.com --time 2000\n  fline create script-execute --file /tmp/pkg.tar --file-args aaa@@bbb\n  fline destroy script-execute --file /tmp/pkg.tar --uid <uid>",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Invocation id shared by a create/destroy pair (generated when absent)
    #[arg(long, global = true, value_name = "UID")]
    pub uid: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inject a fault
    Create {
        #[command(subcommand)]
        action: Action,
    },
    /// Reverse a previously injected fault
    Destroy {
        #[command(subcommand)]
        action: Action,
    },
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Reboot the target host, immediately or at a scheduled time
    HostRestart(HostRestartArgs),
    /// Power the target host off
    HostStop(HostStopArgs),
    /// Delay an HTTP request against a url
    HttpDelay(HttpDelayArgs),
    /// Delay a syscall of a target process via strace injection
    KernelDelay(KernelDelayArgs),
    /// Execute a packaged user script under transcript recording
    ScriptExecute(ScriptExecuteArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Reboot the target host")]
pub struct HostRestartArgs {
    /// Restart schedule: now, +<minutes> or HH:MM; reboots immediately when absent
    #[arg(long, value_name = "TIME")]
    pub time: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Power the target host off")]
pub struct HostStopArgs {
    /// Shutdown schedule: now, +<minutes> or HH:MM; powers off immediately when absent
    #[arg(long, value_name = "TIME")]
    pub time: Option<String>,

    /// Force the shutdown
    #[arg(long)]
    pub forced: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Delay an HTTP request against a url")]
pub struct HttpDelayArgs {
    /// Target url, http or https
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// Sleep before the request, in milliseconds
    #[arg(long, value_name = "MS")]
    pub time: String,
}

#[derive(Parser, Debug)]
#[command(about = "Delay a syscall of a target process")]
pub struct KernelDelayArgs {
    /// Target process ids, comma separated
    #[arg(long, value_name = "PIDS")]
    pub pid: String,

    /// Syscall to inject the delay into
    #[arg(long = "syscall-name", value_name = "NAME")]
    pub syscall_name: String,

    /// Delay duration, with an optional s/ms/us/ns unit
    #[arg(long, value_name = "TIME")]
    pub time: String,

    /// Inject before (enter) or after (exit) the syscall executes
    #[arg(long = "delay-loc", value_name = "LOC")]
    pub delay_loc: String,

    /// First matched syscall occurrence to inject
    #[arg(long, value_name = "N")]
    pub first: Option<u32>,

    /// Last matched syscall occurrence to inject
    #[arg(long, value_name = "N")]
    pub end: Option<u32>,

    /// Inject every N-th occurrence within the first..end window
    #[arg(long, value_name = "N")]
    pub step: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(about = "Execute a packaged user script under transcript recording")]
pub struct ScriptExecuteArgs {
    /// Local script or tar package path on the target
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Url of a tar package to download before execution
    #[arg(long = "download-url", value_name = "URL")]
    pub download_url: Option<String>,

    /// Endpoint that receives the output transcript as JSON
    #[arg(long = "upload-url", value_name = "URL", conflicts_with_all = ["dsn", "nfs_host"])]
    pub upload_url: Option<String>,

    /// SQLite database path that receives the output transcript
    #[arg(long, value_name = "PATH", conflicts_with = "nfs_host")]
    pub dsn: Option<PathBuf>,

    /// Mounted directory that receives a copy of the output transcript
    #[arg(long = "nfs-host", value_name = "DIR")]
    pub nfs_host: Option<PathBuf>,

    /// Positional script arguments joined by the @@ delimiter
    #[arg(long = "file-args", value_name = "ARGS")]
    pub file_args: Option<String>,

    /// Select the recovery entry point instead of the main one
    #[arg(long)]
    pub recover: bool,
}
