//! What the host renders for a session
//!
//! `SessionView` is a pure function of the session state. Hosts either
//! print it (`Display`) or serialise it for a front end.

use crate::{
    config::IntakePolicy,
    error::Result,
    handles::ImageHandle,
    services::{ExportService, PROCESSED_MIME, PROGRESS_MESSAGE},
    session::RemovalSession,
    types::ProcessingStatus,
};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suggested file name for a downloaded result
pub const DOWNLOAD_FILE_NAME: &str = "processed-image.png";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Content of one image pane
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pane {
    /// The handle is not available yet
    Placeholder,
    /// A live image
    Image { url: String, mime: String, size: usize },
}

impl Pane {
    fn from_handle(handle: Option<&ImageHandle>) -> Self {
        handle.map_or(Self::Placeholder, |h| Self::Image {
            url: h.url(),
            mime: h.mime().to_string(),
            size: h.size(),
        })
    }

    /// Whether the pane shows an image
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Original and processed panes side by side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPanes {
    pub original: Pane,
    pub processed: Pane,
}

/// Actions offered to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionBar {
    /// "Process Another Image"
    pub reset: bool,
    /// "Download Processed Image"
    pub download: bool,
}

/// Drop zone text derived from the intake policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeHint {
    pub max_size: String,
    pub formats: String,
}

impl IntakeHint {
    #[must_use]
    pub fn from_policy(policy: &IntakePolicy) -> Self {
        let max_size = if policy.max_bytes % BYTES_PER_MB == 0 {
            format!("{}MB", policy.max_bytes / BYTES_PER_MB)
        } else {
            format!("{} bytes", policy.max_bytes)
        };
        let formats = policy
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        Self { max_size, formats }
    }
}

/// Everything that is rendered for the current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub status: ProcessingStatus,
    pub error_banner: Option<String>,
    pub progress_message: Option<&'static str>,
    pub intake_enabled: bool,
    pub intake_hint: IntakeHint,
    pub panes: Option<ResultPanes>,
    pub actions: ActionBar,
}

impl SessionView {
    /// Derive the view from a session
    #[must_use]
    pub fn from_session(session: &RemovalSession) -> Self {
        let status = session.status();
        let complete = status == ProcessingStatus::Complete;

        let error_banner = match status {
            ProcessingStatus::Error => session.error().map(|e| e.message.clone()),
            _ => None,
        };

        let panes = (status != ProcessingStatus::Idle).then(|| ResultPanes {
            original: Pane::from_handle(session.original_image()),
            processed: Pane::from_handle(session.processed_image()),
        });

        Self {
            status,
            error_banner,
            progress_message: status.is_busy().then_some(PROGRESS_MESSAGE),
            intake_enabled: !status.is_busy(),
            intake_hint: IntakeHint::from_policy(session.intake_policy()),
            panes,
            actions: ActionBar {
                reset: complete,
                download: complete,
            },
        }
    }
}

fn write_pane(f: &mut fmt::Formatter<'_>, title: &str, pane: &Pane) -> fmt::Result {
    match pane {
        Pane::Placeholder => writeln!(f, "  {:<16} ...", title),
        Pane::Image { url, mime, size } => {
            writeln!(f, "  {:<16} {} ({}, {} bytes)", title, url, mime, size)
        },
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(banner) = &self.error_banner {
            writeln!(f, "Error: {}", banner)?;
        }

        if self.intake_enabled {
            writeln!(f, "Drag and drop an image here, or click to select")?;
            writeln!(f, "  Maximum file size: {}", self.intake_hint.max_size)?;
            writeln!(f, "  Supported formats: {}", self.intake_hint.formats)?;
        }

        if let Some(message) = self.progress_message {
            writeln!(f, "{}", message)?;
        }

        if let Some(panes) = &self.panes {
            write_pane(f, "Original Image", &panes.original)?;
            write_pane(f, "Processed Image", &panes.processed)?;
        }

        if self.actions.reset {
            writeln!(f, "[Process Another Image]")?;
        }
        if self.actions.download {
            writeln!(f, "[Download Processed Image]")?;
        }
        Ok(())
    }
}

/// Processed image materialised for saving
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub data: Arc<[u8]>,
}

impl DownloadArtifact {
    pub(crate) fn new(data: Arc<[u8]>) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME,
            mime: PROCESSED_MIME,
            data,
        }
    }

    /// Save into `dir` without overwriting existing files
    ///
    /// # Returns
    /// The path that was written, `processed-image (n).png` when the plain
    /// name is already taken
    pub fn save_into<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        ExportService::save_unique(dir, self.file_name, &self.data)
    }
}
