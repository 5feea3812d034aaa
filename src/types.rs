//! Core value types shared by the session, observers and presentation

use crate::error::StudioError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message shown when a failure carries no usable text of its own
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to process image. Please try again.";

/// Lifecycle of one session.
///
/// `Idle` is initial. `Processing` is entered by an accepted drop and left
/// only through `Complete` or `Error`; both of those return to `Idle` on
/// reset or restart at `Processing` on a new drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Idle,
    Processing,
    Complete,
    Error,
}

impl ProcessingStatus {
    /// Whether a removal is in flight
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Processing)
    }

    /// Whether `reset` is a legal action
    #[must_use]
    pub fn can_reset(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Processing => write!(f, "processing"),
            Self::Complete => write!(f, "complete"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The most recent processing failure, as shown in the error banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingError {
    /// Human-readable message
    pub message: String,
    /// When the failure was recorded
    pub occurred_at: DateTime<Utc>,
}

impl ProcessingError {
    /// Create an error with the given message, falling back to the generic
    /// message when it is blank
    #[must_use]
    pub fn new<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            message,
            occurred_at: Utc::now(),
        }
    }

    /// Error carrying the generic fallback message
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ERROR_MESSAGE)
    }

    /// Derive the banner message from a failure raised by the removal path
    #[must_use]
    pub fn from_failure(error: &StudioError) -> Self {
        match error {
            StudioError::Removal(message) => Self::new(message.as_str()),
            StudioError::Internal(_) => Self::fallback(),
            other => Self::new(other.to_string()),
        }
    }
}

impl std::fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
