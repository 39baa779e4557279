use serde::Serialize;
use strum::{AsRefStr, Display};
use ulid::Ulid;

#[derive(Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-visible report. Failed remote updates surface as notices instead
/// of panics or silent divergence.
#[derive(Clone, Debug, Serialize)]
pub struct Notice {
    pub id: String,
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            severity,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }
}
