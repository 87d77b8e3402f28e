//! Error taxonomy shared by every experiment action.
//!
//! Each variant carries a stable numeric code plus the flag or path context
//! needed to reproduce the condition without reading logs. Delivery failures
//! are deliberately absent: they aggregate into the result payload instead of
//! failing the invocation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("parameter `{name}` is invalid: {reason}")]
    ParameterInvalid { name: &'static str, reason: String },

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("download from {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("extract {} failed: {reason}", .archive.display())]
    Extract { archive: PathBuf, reason: String },

    #[error("no entry point under {}", .0.display())]
    NoEntryPoint(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("channel is missing required commands: {0}")]
    ChannelUnavailable(String),
}

impl ActionError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Stable code reported to the orchestrator alongside the message.
    pub fn code(&self) -> u32 {
        match self {
            Self::MissingParameter(_) => 45,
            Self::ParameterInvalid { .. } => 46,
            Self::FileNotFound(_) => 47,
            Self::Download { .. } => 48,
            Self::Extract { .. } => 49,
            Self::NoEntryPoint(_) => 50,
            Self::Io { .. } => 51,
            Self::ChannelUnavailable(_) => 52,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ActionError::MissingParameter("file").code(), 45);
        assert_eq!(
            ActionError::ChannelUnavailable("tar".to_string()).code(),
            52
        );
    }

    #[test]
    fn messages_carry_context() {
        let err = ActionError::ParameterInvalid {
            name: "time",
            reason: "`abc` is not a number".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("time"));
        assert!(text.contains("abc"));
    }
}
