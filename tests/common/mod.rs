//! Shared test infrastructure for integration tests.

use anyhow::{Context, Result};
use serde_json::Value;
use std::process::{Command, Output};

/// Run the fline binary with the given arguments and parse its JSON result.
pub fn run_fline(args: &[&str]) -> Result<(Output, Value)> {
    let bin = env!("CARGO_BIN_EXE_fline");
    let output = Command::new(bin)
        .args(args)
        .output()
        .with_context(|| format!("run fline {}", args.join(" ")))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let result: Value = serde_json::from_str(stdout.trim())
        .with_context(|| format!("parse result JSON from: {stdout}"))?;
    Ok((output, result))
}

/// Unique invocation id per test process so concurrent runs never collide.
pub fn test_uid(label: &str) -> String {
    format!("it-{label}-{}", std::process::id())
}
