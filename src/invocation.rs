//! Invocation identity: one create-or-destroy request under a stable id.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Destroy,
}

/// Identity of one create/destroy pair. The uid is caller-supplied so destroy
/// can find the artifacts create left behind; a fresh one is generated when
/// the caller does not care.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub uid: String,
    pub mode: Mode,
}

impl Invocation {
    pub fn new(uid: Option<String>, mode: Mode) -> Self {
        let uid = uid
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self { uid, mode }
    }
}
