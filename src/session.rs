//! Processing state machine for one background-removal session
//!
//! A `RemovalSession` owns everything the host renders: the status, both
//! image handles and the last error. Submitting is split in two so the
//! host can render `Processing` before the removal resolves:
//!
//! 1. [`RemovalSession::begin`] validates the drop, clears the previous
//!    result, creates the original handle and enters `Processing`.
//! 2. [`PendingRemoval::run`] awaits the capability.
//! 3. [`RemovalSession::finish`] applies the outcome.
//!
//! [`RemovalSession::submit`] chains the three.
//!
//! A drop that arrives while a removal is in flight is ignored
//! ([`SubmitRefusal::Busy`]); there is no cancellation.

use crate::{
    config::{IntakePolicy, RemovalOptions, StudioConfig},
    error::{Result, StudioError, SubmitRefusal},
    handles::{HandleStore, ImageHandle, ImageSource},
    intake::{ImageFile, IntakeFilter},
    presentation::{DownloadArtifact, SessionView},
    remover::BackgroundRemover,
    services::{NoOpObserver, PngNormalizer, StatusObserver, PROCESSED_MIME},
    types::{ProcessingError, ProcessingStatus},
};
use instant::{Duration, Instant};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// State machine behind one UI session
pub struct RemovalSession {
    id: Uuid,
    status: ProcessingStatus,
    original: Option<ImageHandle>,
    processed: Option<ImageHandle>,
    error: Option<ProcessingError>,
    handles: HandleStore,
    intake: IntakeFilter,
    options: RemovalOptions,
    remover: Arc<dyn BackgroundRemover>,
    observer: Arc<dyn StatusObserver>,
    ticket: u64,
    span: Span,
}

impl RemovalSession {
    /// Create an idle session using `remover` as the removal capability
    #[must_use]
    pub fn new(remover: Arc<dyn BackgroundRemover>, config: &StudioConfig) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("session", session = %id, remover = %remover.name());
        debug!(parent: &span, "Created removal session");
        Self {
            id,
            status: ProcessingStatus::Idle,
            original: None,
            processed: None,
            error: None,
            handles: HandleStore::new(),
            intake: IntakeFilter::new(config.intake.clone()),
            options: config.removal,
            remover,
            observer: Arc::new(NoOpObserver),
            ticket: 0,
            span,
        }
    }

    /// Attach an observer for transitions, rejections and failures
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Session identifier
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    /// Handle to the original image, present whenever status is not idle
    #[must_use]
    pub fn original_image(&self) -> Option<&ImageHandle> {
        self.original.as_ref()
    }

    /// Handle to the processed image, present only when complete
    #[must_use]
    pub fn processed_image(&self) -> Option<&ImageHandle> {
        self.processed.as_ref()
    }

    /// Most recent failure, present only in the error state
    #[must_use]
    pub fn error(&self) -> Option<&ProcessingError> {
        self.error.as_ref()
    }

    /// Live handles owned by this session
    #[must_use]
    pub fn handles(&self) -> &HandleStore {
        &self.handles
    }

    /// Accept policy applied to drops
    #[must_use]
    pub fn intake_policy(&self) -> &IntakePolicy {
        self.intake.policy()
    }

    /// Options passed to the capability
    #[must_use]
    pub fn options(&self) -> &RemovalOptions {
        &self.options
    }

    /// Resolve one of this session's handles
    pub fn resolve(&self, handle: &ImageHandle) -> Result<ImageSource> {
        self.handles.resolve(handle)
    }

    /// What the host should render right now
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::from_session(self)
    }

    /// Synchronous half of a submission.
    ///
    /// On success the session is already `Processing` with the original
    /// handle available, and the returned [`PendingRemoval`] must be run and
    /// handed to [`finish`](Self::finish).
    ///
    /// # Errors
    /// - [`SubmitRefusal::Busy`] while a removal is in flight
    /// - [`SubmitRefusal::Rejected`] when the intake policy refuses the drop
    ///
    /// Neither refusal changes any state.
    pub fn begin(&mut self, files: Vec<ImageFile>) -> std::result::Result<PendingRemoval, SubmitRefusal> {
        if self.status.is_busy() {
            warn!(session = %self.id, "Ignoring drop while a removal is in progress");
            return Err(SubmitRefusal::Busy);
        }

        let file = match self.intake.accept(files) {
            Ok(file) => file,
            Err(rejection) => {
                warn!(session = %self.id, reason = %rejection, "Intake rejected drop");
                self.observer.on_rejected(&rejection);
                return Err(rejection.into());
            },
        };

        self.release_result();
        self.original = Some(self.handles.create(Arc::clone(&file.data), file.mime.clone()));
        self.ticket += 1;
        debug!(
            session = %self.id,
            ticket = self.ticket,
            file = %file.name,
            size_bytes = file.size(),
            "Accepted image"
        );
        self.transition(ProcessingStatus::Processing);

        Ok(PendingRemoval {
            session_id: self.id,
            ticket: self.ticket,
            file,
            options: self.options,
            remover: Arc::clone(&self.remover),
            span: self.span.clone(),
        })
    }

    /// Apply the outcome of the in-flight removal and return the new status.
    ///
    /// Outcomes that do not belong to the current request are discarded.
    pub fn finish(&mut self, outcome: RemovalOutcome) -> ProcessingStatus {
        if outcome.session_id != self.id
            || outcome.ticket != self.ticket
            || self.status != ProcessingStatus::Processing
        {
            warn!(
                session = %self.id,
                ticket = outcome.ticket,
                current_ticket = self.ticket,
                status = %self.status,
                "Discarding stale removal outcome"
            );
            return self.status;
        }

        match outcome.result {
            Ok(png) => {
                info!(
                    session = %self.id,
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    size_bytes = png.len(),
                    "Background removed"
                );
                self.processed = Some(self.handles.create(Arc::from(png), PROCESSED_MIME));
                self.transition(ProcessingStatus::Complete);
            },
            Err(failure) => {
                error!(
                    session = %self.id,
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    message = %failure.message,
                    "Error processing image"
                );
                self.observer.on_failure(&failure);
                self.error = Some(failure);
                self.transition(ProcessingStatus::Error);
            },
        }
        self.status
    }

    /// Submit a drop and wait for the removal to finish
    ///
    /// # Errors
    /// Same refusals as [`begin`](Self::begin). Removal failures are not
    /// errors here: they leave the session in `Error` and are reported
    /// through [`error`](Self::error).
    ///
    /// # Panics
    /// Must be polled inside a Tokio runtime, see [`PendingRemoval::run`].
    pub async fn submit(
        &mut self,
        files: Vec<ImageFile>,
    ) -> std::result::Result<ProcessingStatus, SubmitRefusal> {
        let pending = self.begin(files)?;
        let outcome = pending.run().await;
        Ok(self.finish(outcome))
    }

    /// Return to idle, releasing both handles and the error
    ///
    /// # Errors
    /// `StudioError::InvalidTransition` unless the session is complete or
    /// in error; nothing is changed in that case.
    pub fn reset(&mut self) -> Result<()> {
        if !self.status.can_reset() {
            return Err(StudioError::InvalidTransition {
                action: "reset",
                status: self.status,
            });
        }
        self.release_result();
        self.transition(ProcessingStatus::Idle);
        Ok(())
    }

    /// Materialise the processed image for saving
    ///
    /// # Errors
    /// `StudioError::InvalidTransition` unless the session is complete.
    pub fn download(&self) -> Result<DownloadArtifact> {
        match (&self.status, &self.processed) {
            (ProcessingStatus::Complete, Some(handle)) => {
                let source = self.handles.resolve(handle)?;
                Ok(DownloadArtifact::new(source.data))
            },
            _ => Err(StudioError::InvalidTransition {
                action: "download",
                status: self.status,
            }),
        }
    }

    /// Revoke both handles and drop the error
    fn release_result(&mut self) {
        if let Some(handle) = self.processed.take() {
            self.handles.revoke(handle);
        }
        if let Some(handle) = self.original.take() {
            self.handles.revoke(handle);
        }
        self.error = None;
    }

    fn transition(&mut self, to: ProcessingStatus) {
        let from = self.status;
        self.status = to;
        debug!(session = %self.id, %from, %to, "Status changed");
        self.observer.on_transition(from, to);
    }
}

impl Drop for RemovalSession {
    fn drop(&mut self) {
        let released = self.handles.clear();
        if released > 0 {
            debug!(session = %self.id, released, "Released handles on session drop");
        }
    }
}

/// An accepted drop waiting for the removal capability
pub struct PendingRemoval {
    session_id: Uuid,
    ticket: u64,
    file: ImageFile,
    options: RemovalOptions,
    remover: Arc<dyn BackgroundRemover>,
    span: Span,
}

impl PendingRemoval {
    /// The accepted file
    #[must_use]
    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    /// Request generation this removal belongs to
    #[must_use]
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Run the capability to completion.
    ///
    /// The call runs on its own task, so a panic inside the capability is
    /// reported as a failure with the fallback message instead of unwinding
    /// into the host. Successful payloads are normalised to PNG.
    ///
    /// # Panics
    /// Must be polled inside a Tokio runtime; the capability is spawned
    /// with `tokio::spawn`.
    pub async fn run(self) -> RemovalOutcome {
        let started = Instant::now();
        let span = info_span!(
            parent: &self.span,
            "removal",
            session = %self.session_id,
            ticket = self.ticket,
            remover = %self.remover.name(),
            file = %self.file.name
        );

        let Self {
            session_id,
            ticket,
            file,
            options,
            remover,
            ..
        } = self;

        let task = tokio::spawn(
            async move {
                let payload = remover.remove(&file, &options).await?;
                PngNormalizer::ensure_png(&payload)
            }
            .instrument(span),
        );

        let result = match task.await {
            Ok(Ok(png)) => Ok(png),
            Ok(Err(e)) => Err(ProcessingError::from_failure(&e)),
            Err(join_error) => {
                error!(error = %join_error, "Removal task did not complete");
                Err(ProcessingError::fallback())
            },
        };

        RemovalOutcome {
            session_id,
            ticket,
            result,
            elapsed: started.elapsed(),
        }
    }
}

/// Result of one removal, ready to be applied with [`RemovalSession::finish`]
#[derive(Debug)]
pub struct RemovalOutcome {
    session_id: Uuid,
    ticket: u64,
    result: std::result::Result<Vec<u8>, ProcessingError>,
    elapsed: Duration,
}

impl RemovalOutcome {
    /// Whether the removal produced an image
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Wall time spent in the capability
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
