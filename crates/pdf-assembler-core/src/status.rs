//! Transient user-facing status messages.

use serde::{Deserialize, Serialize};

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

impl StatusLevel {
    /// CSS class name used by the web front-end
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    pub fn new(level: StatusLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Error, message)
    }
}

/// Holds at most one status; every `show` overwrites the previous one.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    current: Option<Status>,
}

impl StatusBoard {
    pub const fn new() -> Self {
        Self { current: None }
    }

    pub fn show(&mut self, status: Status) {
        match status.level {
            StatusLevel::Error => tracing::warn!("{}", status.message),
            _ => tracing::info!("{}", status.message),
        }
        self.current = Some(status);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub const fn current(&self) -> Option<&Status> {
        self.current.as_ref()
    }
}
