//! Error types for background removal sessions

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Errors raised by the session, its handles and the removal capability
#[derive(Error, Debug)]
pub enum StudioError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration file could not be parsed or written
    #[error("Configuration format error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external removal capability failed.
    ///
    /// The payload is the capability's own message and is shown to the user
    /// verbatim, so it carries no prefix.
    #[error("{0}")]
    Removal(String),

    /// An action was requested in a state that does not allow it
    #[error("Cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: crate::types::ProcessingStatus,
    },

    /// A handle was revoked or never belonged to this store
    #[error("Handle error: {0}")]
    Handle(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudioError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new removal error
    pub fn removal<S: Into<String>>(msg: S) -> Self {
        Self::Removal(msg.into())
    }

    /// Create a new handle error
    pub fn handle<S: Into<String>>(msg: S) -> Self {
        Self::Handle(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }
}

/// Reasons the intake policy refused a drop.
///
/// A rejection never changes session state and never creates a handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeRejection {
    /// The drop contained no files
    #[error("no file was provided")]
    NoFiles,

    /// More files than the policy allows
    #[error("{count} files dropped, at most {max} accepted")]
    TooManyFiles { count: usize, max: usize },

    /// MIME type outside the accepted pattern
    #[error("'{name}' has unsupported type {mime}")]
    UnsupportedType { name: String, mime: String },

    /// Extension not in the accepted list
    #[error("'{name}' has unsupported extension (accepted: {accepted})")]
    UnsupportedExtension { name: String, accepted: String },

    /// File exceeds the size ceiling
    #[error("'{name}' is {size} bytes, limit is {max} bytes")]
    TooLarge { name: String, size: u64, max: u64 },
}

/// Why `begin`/`submit` did not start a removal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRefusal {
    /// The intake policy refused the files
    #[error("intake rejected: {0}")]
    Rejected(#[from] IntakeRejection),

    /// A removal is already in flight for this session
    #[error("a removal is already in progress")]
    Busy,
}
