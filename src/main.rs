use clap::Parser;
use serde_json::Value;

mod channel;
mod cli;
mod errors;
mod host;
mod http;
mod invocation;
mod kernel;
mod response;
mod script;

use channel::{Channel, LocalChannel};
use cli::{Action, Command, RootArgs};
use errors::ActionError;
use invocation::{Invocation, Mode};
use response::ExperimentResult;

fn main() {
    init_tracing();
    let args = RootArgs::parse();
    std::process::exit(run(args));
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: RootArgs) -> i32 {
    let channel = LocalChannel::new();
    let (mode, action) = match args.command {
        Command::Create { action } => (Mode::Create, action),
        Command::Destroy { action } => (Mode::Destroy, action),
    };
    let invocation = Invocation::new(args.uid, mode);
    tracing::debug!(uid = %invocation.uid, ?mode, "dispatch experiment action");

    let result = dispatch(&invocation, &action, &channel)
        .unwrap_or_else(|err| ExperimentResult::from_error(&err));
    match serde_json::to_string_pretty(&result) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("serialize result: {err}"),
    }
    if result.success {
        0
    } else {
        1
    }
}

fn dispatch(
    invocation: &Invocation,
    action: &Action,
    channel: &dyn Channel,
) -> Result<ExperimentResult, ActionError> {
    match (invocation.mode, action) {
        (Mode::Create, Action::HostRestart(args)) => host::restart(invocation, args, channel),
        (Mode::Create, Action::HostStop(args)) => host::stop(invocation, args, channel),
        (Mode::Create, Action::HttpDelay(args)) => http::delay(invocation, args, channel),
        (Mode::Create, Action::KernelDelay(args)) => kernel::delay(invocation, args, channel),
        (Mode::Create, Action::ScriptExecute(args)) => script::create(invocation, args, channel),
        (Mode::Destroy, Action::ScriptExecute(args)) => script::destroy(invocation, args, channel),
        // The one-shot faults have nothing to reverse; acknowledge the uid so
        // the orchestrator can close out the experiment.
        (Mode::Destroy, _) => Ok(ExperimentResult::ok(Value::String(invocation.uid.clone()))),
    }
}
