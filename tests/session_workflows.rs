//! End-to-end session workflows
//!
//! Each test drives a `RemovalSession` through the same user actions a
//! front end would: drop, wait, reset, download.

mod common;

use bgremove_studio::{
    IntakeRejection, Pane, ProcessingStatus, RemovalSession, StudioConfig, StudioError,
    SubmitRefusal, FALLBACK_ERROR_MESSAGE,
};
use common::{encoded_image, sized_file, transparent_png, RecordingObserver, ScriptedRemover};
use image::ImageFormat;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

const MIB: usize = 1024 * 1024;

fn session_with(
    remover: &Arc<ScriptedRemover>,
    observer: &Arc<RecordingObserver>,
) -> RemovalSession {
    RemovalSession::new(remover.clone(), &StudioConfig::default()).with_observer(observer.clone())
}

#[tokio::test]
async fn test_png_drop_completes() {
    let remover = Arc::new(ScriptedRemover::returning(transparent_png()));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    let status = session
        .submit(vec![sized_file("photo.png", "image/png", 2 * MIB)])
        .await
        .unwrap();

    assert_eq!(status, ProcessingStatus::Complete);
    assert_eq!(
        observer.path(),
        vec![
            ProcessingStatus::Idle,
            ProcessingStatus::Processing,
            ProcessingStatus::Complete
        ]
    );
    let original = session.original_image().unwrap();
    assert_eq!(original.mime(), "image/png");
    assert_eq!(original.size(), 2 * MIB);
    let processed = session.processed_image().unwrap();
    assert_eq!(processed.mime(), "image/png");
    assert!(session.error().is_none());
    assert_eq!(remover.calls(), vec!["photo.png"]);
}

#[tokio::test]
async fn test_capability_rejection_enters_error() {
    let remover = Arc::new(ScriptedRemover::rejecting("model load failed"));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    let status = session
        .submit(vec![sized_file("photo.png", "image/png", 1024)])
        .await
        .unwrap();

    assert_eq!(status, ProcessingStatus::Error);
    assert_eq!(
        observer.path(),
        vec![
            ProcessingStatus::Idle,
            ProcessingStatus::Processing,
            ProcessingStatus::Error
        ]
    );
    assert_eq!(session.error().unwrap().message, "model load failed");
    assert_eq!(observer.failures(), vec!["model load failed"]);
    assert!(session.processed_image().is_none());
    assert_eq!(
        session.view().error_banner.as_deref(),
        Some("model load failed")
    );
}

#[tokio::test]
async fn test_pdf_drop_is_ignored() {
    let remover = Arc::new(ScriptedRemover::returning(transparent_png()));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    let refusal = session
        .submit(vec![sized_file("document.pdf", "application/pdf", 4096)])
        .await
        .unwrap_err();

    assert!(matches!(
        refusal,
        SubmitRefusal::Rejected(IntakeRejection::UnsupportedType { .. })
    ));
    assert_eq!(session.status(), ProcessingStatus::Idle);
    assert_eq!(session.handles().live_count(), 0);
    assert!(session.view().error_banner.is_none());
    assert_eq!(observer.path(), vec![ProcessingStatus::Idle]);
    assert_eq!(observer.rejections().len(), 1);
    assert!(remover.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_jpeg_is_ignored() {
    let remover = Arc::new(ScriptedRemover::returning(transparent_png()));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    let refusal = session
        .submit(vec![sized_file("huge.jpg", "image/jpeg", 15 * MIB)])
        .await
        .unwrap_err();

    assert_eq!(
        refusal,
        SubmitRefusal::Rejected(IntakeRejection::TooLarge {
            name: "huge.jpg".to_string(),
            size: (15 * MIB) as u64,
            max: 10_485_760,
        })
    );
    assert_eq!(session.status(), ProcessingStatus::Idle);
    assert!(session.original_image().is_none());
    assert_eq!(session.handles().live_count(), 0);
}

#[tokio::test]
async fn test_reset_from_complete_releases_handles() {
    let remover = Arc::new(ScriptedRemover::returning(transparent_png()));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);
    session
        .submit(vec![sized_file("photo.png", "image/png", 1024)])
        .await
        .unwrap();
    assert_eq!(session.handles().live_count(), 2);

    session.reset().unwrap();

    assert_eq!(session.status(), ProcessingStatus::Idle);
    assert!(session.original_image().is_none());
    assert!(session.processed_image().is_none());
    assert_eq!(session.handles().live_count(), 0);
    assert_eq!(session.handles().live_bytes(), 0);
    assert!(session.view().panes.is_none());
}

#[tokio::test]
async fn test_reset_from_error_releases_handles() {
    let remover = Arc::new(ScriptedRemover::rejecting("model load failed"));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);
    let status = session
        .submit(vec![sized_file("photo.png", "image/png", 1024)])
        .await
        .unwrap();
    assert_eq!(status, ProcessingStatus::Error);
    assert_eq!(session.handles().live_count(), 1);
    assert!(session.view().error_banner.is_some());

    session.reset().unwrap();

    assert_eq!(session.status(), ProcessingStatus::Idle);
    assert!(session.error().is_none());
    assert!(session.original_image().is_none());
    assert!(session.processed_image().is_none());
    assert_eq!(session.handles().live_count(), 0);
    assert!(session.view().error_banner.is_none());
    assert!(session.view().panes.is_none());
}

#[tokio::test]
async fn test_new_drop_from_complete_clears_stale_result() {
    let gate = Arc::new(Notify::new());
    let remover = Arc::new(ScriptedRemover::returning(transparent_png()).gated(gate.clone()));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    gate.notify_one();
    session
        .submit(vec![sized_file("first.png", "image/png", 64)])
        .await
        .unwrap();
    let stale_url = session.processed_image().unwrap().url();

    let pending = session
        .begin(vec![sized_file("second.png", "image/png", 128)])
        .unwrap();

    // Nothing from the first result is visible next to the new request
    assert_eq!(session.status(), ProcessingStatus::Processing);
    assert!(session.processed_image().is_none());
    assert!(session.error().is_none());
    assert_eq!(session.original_image().unwrap().size(), 128);
    assert_eq!(session.handles().live_count(), 1);
    let view = session.view();
    let panes = view.panes.unwrap();
    assert!(panes.original.is_image());
    assert_eq!(panes.processed, Pane::Placeholder);

    let running = tokio::spawn(pending.run());
    gate.notify_one();
    let outcome = running.await.unwrap();
    assert_eq!(session.finish(outcome), ProcessingStatus::Complete);
    assert_ne!(session.processed_image().unwrap().url(), stale_url);
    assert_eq!(
        observer.path(),
        vec![
            ProcessingStatus::Idle,
            ProcessingStatus::Processing,
            ProcessingStatus::Complete,
            ProcessingStatus::Processing,
            ProcessingStatus::Complete
        ]
    );
}

#[tokio::test]
async fn test_new_drop_from_error_clears_banner() {
    let remover = Arc::new(ScriptedRemover::rejecting("unsupported image"));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);
    session
        .submit(vec![sized_file("first.png", "image/png", 64)])
        .await
        .unwrap();
    assert!(session.error().is_some());

    let pending = session
        .begin(vec![sized_file("second.png", "image/png", 64)])
        .unwrap();
    assert!(session.error().is_none());
    assert!(session.view().error_banner.is_none());

    let outcome = pending.run().await;
    assert_eq!(session.finish(outcome), ProcessingStatus::Error);
    assert_eq!(session.error().unwrap().message, "unsupported image");
}

#[tokio::test]
async fn test_busy_submission_is_ignored() {
    let gate = Arc::new(Notify::new());
    let remover = Arc::new(ScriptedRemover::returning(transparent_png()).gated(gate.clone()));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    let pending = session
        .begin(vec![sized_file("first.png", "image/png", 64)])
        .unwrap();
    let running = tokio::spawn(pending.run());

    let refusal = session
        .submit(vec![sized_file("second.png", "image/png", 64)])
        .await
        .unwrap_err();
    assert_eq!(refusal, SubmitRefusal::Busy);
    assert_eq!(session.original_image().unwrap().size(), 64);
    assert_eq!(session.handles().live_count(), 1);

    gate.notify_one();
    let outcome = running.await.unwrap();
    assert_eq!(session.finish(outcome), ProcessingStatus::Complete);
    assert_eq!(remover.calls(), vec!["first.png"]);
}

#[tokio::test]
async fn test_panic_in_capability_becomes_fallback_error() {
    let remover = Arc::new(ScriptedRemover::panicking());
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    let status = session
        .submit(vec![sized_file("photo.png", "image/png", 64)])
        .await
        .unwrap();

    assert_eq!(status, ProcessingStatus::Error);
    assert_eq!(session.error().unwrap().message, FALLBACK_ERROR_MESSAGE);
    assert_eq!(observer.failures(), vec![FALLBACK_ERROR_MESSAGE]);
}

#[tokio::test]
async fn test_non_png_result_is_normalised() {
    let remover = Arc::new(ScriptedRemover::returning(encoded_image(
        8,
        8,
        ImageFormat::Jpeg,
    )));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);

    session
        .submit(vec![sized_file("photo.jpg", "image/jpeg", 64)])
        .await
        .unwrap();

    let artifact = session.download().unwrap();
    assert_eq!(artifact.mime, "image/png");
    assert_eq!(
        image::guess_format(&artifact.data).unwrap(),
        ImageFormat::Png
    );
}

#[tokio::test]
async fn test_download_and_reset_actions() {
    let remover = Arc::new(ScriptedRemover::returning(transparent_png()));
    let observer = RecordingObserver::new();
    let mut session = session_with(&remover, &observer);
    let downloads = TempDir::new().unwrap();

    assert!(matches!(
        session.download(),
        Err(StudioError::InvalidTransition { .. })
    ));
    assert!(session.reset().is_err());

    session
        .submit(vec![sized_file("photo.webp", "image/webp", 64)])
        .await
        .unwrap();
    let view = session.view();
    assert!(view.actions.download && view.actions.reset);

    let first = session.download().unwrap().save_into(downloads.path()).unwrap();
    let second = session.download().unwrap().save_into(downloads.path()).unwrap();
    assert_eq!(first.file_name().unwrap(), "processed-image.png");
    assert_eq!(second.file_name().unwrap(), "processed-image (1).png");
    assert_eq!(std::fs::read(first).unwrap(), transparent_png());

    // Download leaves the session untouched
    assert_eq!(session.status(), ProcessingStatus::Complete);
    session.reset().unwrap();
    assert!(session.download().is_err());
}
