//! Transcript delivery.
//!
//! Delivery never decides whether the experiment succeeded: the execution
//! outcome sets the primary success flag, and every delivery failure lands as
//! a named string field in the payload so the orchestrator can tell "fault
//! injected, reporting broken" apart from "fault injection failed".

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::ScriptExecuteArgs;
use crate::response::{ExperimentResult, CODE_EXEC_FAILED, CODE_OK};
use crate::script::record::{ExecutionOutcome, RecordingSession};

#[derive(Debug, Clone)]
pub enum DeliveryTarget {
    Upload(String),
    Database(PathBuf),
    Nfs(PathBuf),
    Inline,
}

impl DeliveryTarget {
    /// Mutual exclusion of the three external targets is enforced by the flag
    /// parser; this only picks the configured one.
    pub fn from_flags(args: &ScriptExecuteArgs) -> Self {
        if let Some(url) = &args.upload_url {
            Self::Upload(url.clone())
        } else if let Some(dsn) = &args.dsn {
            Self::Database(dsn.clone())
        } else if let Some(dir) = &args.nfs_host {
            Self::Nfs(dir.clone())
        } else {
            Self::Inline
        }
    }
}

#[derive(Serialize)]
struct UploadPayload<'a> {
    uid: &'a str,
    output: &'a str,
}

pub fn deliver(
    outcome: &ExecutionOutcome,
    session: &RecordingSession,
    target: &DeliveryTarget,
    uid: &str,
) -> ExperimentResult {
    let mut payload = Map::new();
    payload.insert("uid".to_string(), Value::String(uid.to_string()));
    payload.insert(
        "execution".to_string(),
        Value::String(outcome.detail.clone()),
    );

    // Recorded runs leave their combined output in the session file; direct
    // runs already returned it through the channel.
    let transcript = if outcome.recorded {
        match fs::read_to_string(&session.output_path) {
            Ok(text) => text,
            Err(err) => {
                payload.insert(
                    "read_error".to_string(),
                    Value::String(format!(
                        "read {}: {err}",
                        session.output_path.display()
                    )),
                );
                String::new()
            }
        }
    } else {
        outcome.detail.clone()
    };

    match target {
        DeliveryTarget::Inline => {
            payload.insert("output".to_string(), Value::String(transcript));
        }
        DeliveryTarget::Upload(url) => {
            if let Err(err) = upload(url, uid, &transcript) {
                tracing::warn!(url = %url, error = %format!("{err:#}"), "transcript upload failed");
                payload.insert("upload_error".to_string(), Value::String(format!("{err:#}")));
            }
        }
        DeliveryTarget::Database(dsn) => {
            if let Err(err) = store(dsn, uid, &transcript) {
                tracing::warn!(dsn = %dsn.display(), error = %format!("{err:#}"), "transcript insert failed");
                payload.insert(
                    "database_error".to_string(),
                    Value::String(format!("{err:#}")),
                );
            }
        }
        DeliveryTarget::Nfs(dir) => {
            if let Err(err) = copy_out(dir, uid, session) {
                tracing::warn!(dir = %dir.display(), error = %format!("{err:#}"), "transcript copy failed");
                payload.insert("copy_error".to_string(), Value::String(format!("{err:#}")));
            }
        }
    }

    let (code, error) = if outcome.success {
        (CODE_OK, None)
    } else {
        (
            CODE_EXEC_FAILED,
            Some("script exited with a non-zero status".to_string()),
        )
    };
    ExperimentResult {
        success: outcome.success,
        code,
        result: Value::Object(payload),
        error,
    }
}

fn upload(url: &str, uid: &str, output: &str) -> Result<()> {
    let payload = UploadPayload { uid, output };
    ureq::post(url)
        .send_json(&payload)
        .with_context(|| format!("post transcript to {url}"))?;
    Ok(())
}

fn store(dsn: &Path, uid: &str, output: &str) -> Result<()> {
    let connection = rusqlite::Connection::open(dsn)
        .with_context(|| format!("open database {}", dsn.display()))?;
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS script_transcripts (
                uid TEXT PRIMARY KEY,
                output TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )",
        )
        .context("create transcript table")?;
    connection
        .execute(
            "INSERT INTO script_transcripts (uid, output, recorded_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(uid) DO UPDATE SET
                 output = excluded.output,
                 recorded_at = excluded.recorded_at",
            rusqlite::params![uid, output],
        )
        .context("upsert transcript row")?;
    Ok(())
}

fn copy_out(dir: &Path, uid: &str, session: &RecordingSession) -> Result<()> {
    let destination = dir.join(format!("{uid}.out"));
    fs::copy(&session.output_path, &destination)
        .with_context(|| format!("copy transcript to {}", destination.display()))?;
    Ok(())
}
