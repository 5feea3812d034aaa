#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # bgremove-studio
//!
//! Session logic for a single-image background-removal front end: accept one
//! dropped image, hand it to an external removal capability, and expose the
//! original next to the transparent PNG result with a download action.
//!
//! The background removal itself is not implemented here. It is reached
//! through the [`BackgroundRemover`] trait; [`CommandRemover`] runs an
//! external program such as the `imgly-bgremove` CLI.
//!
//! ## Features
//!
//! - **Processing state machine**: idle → processing → complete | error,
//!   with reset and a single in-flight removal
//! - **Intake policy**: MIME pattern, extension list, file count and size
//!   limits, checked before any state changes
//! - **Revocable handles**: image bytes live in a session-owned store and
//!   are released on reset, on a new drop, or when the session is dropped
//! - **Presentation model**: `SessionView` tells a host exactly what to render
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_studio::{CommandRemover, ImageFile, RemovalSession, StudioConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StudioConfig::default();
//! let remover = Arc::new(CommandRemover::from_config(&config.remover));
//! let mut session = RemovalSession::new(remover, &config);
//!
//! let file = ImageFile::from_path("photo.jpg")?;
//! session.submit(vec![file]).await?;
//! println!("{}", session.view());
//!
//! if let Ok(artifact) = session.download() {
//!     artifact.save_into(".")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Hosts that need to render `Processing` before the removal resolves use
//! [`RemovalSession::begin`], [`PendingRemoval::run`] and
//! [`RemovalSession::finish`] instead of `submit`.
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, spinner and tracing setup
//! - `webp-support` (default): decode WebP payloads when normalising to PNG
//! - `tracing-json`: JSON log output for the CLI

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod handles;
pub mod intake;
pub mod presentation;
pub mod remover;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

// Public API exports
pub use backends::CommandRemover;
pub use config::{IntakePolicy, RemovalOptions, RemoverCommand, StudioConfig, StudioConfigBuilder};
pub use error::{IntakeRejection, Result, StudioError, SubmitRefusal};
pub use handles::{HandleStore, ImageHandle, ImageSource};
pub use intake::{ImageFile, IntakeFilter};
pub use presentation::{ActionBar, DownloadArtifact, Pane, ResultPanes, SessionView};
pub use remover::BackgroundRemover;
pub use services::{ConsoleObserver, NoOpObserver, StatusObserver};
pub use session::{PendingRemoval, RemovalOutcome, RemovalSession};
pub use types::{ProcessingError, ProcessingStatus, FALLBACK_ERROR_MESSAGE};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, spans, TracingConfig, TracingFormat};
