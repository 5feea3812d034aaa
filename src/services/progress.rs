//! Status reporting service
//!
//! This module separates reporting of session transitions from the state
//! machine itself, so each host can present them its own way.

use crate::{error::IntakeRejection, types::ProcessingError, types::ProcessingStatus};

/// User-facing text shown while a removal is in flight
pub const PROGRESS_MESSAGE: &str = "Removing background... This may take a few moments";

/// Trait for observing a session's state machine
pub trait StatusObserver: Send + Sync {
    /// Called after every status change
    ///
    /// # Arguments
    /// * `from` - Status before the transition
    /// * `to` - Status after the transition
    fn on_transition(&self, from: ProcessingStatus, to: ProcessingStatus);

    /// Called when a drop was refused by the intake policy
    fn on_rejected(&self, _rejection: &IntakeRejection) {}

    /// Called when a removal failed and the session entered `Error`
    fn on_failure(&self, _error: &ProcessingError) {}
}

/// Observer that discards all notifications
pub struct NoOpObserver;

impl StatusObserver for NoOpObserver {
    fn on_transition(&self, _from: ProcessingStatus, _to: ProcessingStatus) {
        // Intentionally empty - discards transitions
    }
}

/// Observer that logs notifications through the `log` facade
pub struct ConsoleObserver {
    verbose: bool,
}

impl ConsoleObserver {
    /// Create a new console observer
    ///
    /// # Arguments
    /// * `verbose` - Also log transitions that carry no user-facing message
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl StatusObserver for ConsoleObserver {
    fn on_transition(&self, from: ProcessingStatus, to: ProcessingStatus) {
        match to {
            ProcessingStatus::Processing => log::info!("⏳ {}", PROGRESS_MESSAGE),
            ProcessingStatus::Complete => log::info!("✅ Background removed"),
            ProcessingStatus::Error | ProcessingStatus::Idle => {
                if self.verbose {
                    log::info!("{} → {}", from, to);
                }
            },
        }
    }

    fn on_rejected(&self, rejection: &IntakeRejection) {
        log::warn!("⚠️  File ignored: {}", rejection);
    }

    fn on_failure(&self, error: &ProcessingError) {
        log::error!("❌ {}", error.message);
    }
}
