//! Result envelope returned for every invocation.

use serde::Serialize;
use serde_json::Value;

use crate::channel::ChannelResponse;
use crate::errors::ActionError;

pub const CODE_OK: u32 = 200;
/// The injected command itself exited non-zero; the fault may still be live.
pub const CODE_EXEC_FAILED: u32 = 55;

#[derive(Serialize, Debug)]
pub struct ExperimentResult {
    pub success: bool,
    pub code: u32,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExperimentResult {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            code: CODE_OK,
            result,
            error: None,
        }
    }

    pub fn from_error(err: &ActionError) -> Self {
        Self {
            success: false,
            code: err.code(),
            result: Value::Null,
            error: Some(err.to_string()),
        }
    }

    /// Map a single channel command outcome straight into a result, the shape
    /// used by the one-shot actions (host, http, kernel).
    pub fn from_channel(response: ChannelResponse) -> Self {
        if response.success {
            Self::ok(Value::String(response.result))
        } else {
            Self {
                success: false,
                code: CODE_EXEC_FAILED,
                result: Value::Null,
                error: Some(response.result),
            }
        }
    }
}
