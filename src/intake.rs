//! Image intake: the accept policy applied to every drop
//!
//! The filter knows nothing about removal. It either hands back the single
//! accepted file or explains why the drop was refused.

use crate::{
    config::IntakePolicy,
    error::{IntakeRejection, Result, StudioError},
};
use std::path::Path;
use std::sync::Arc;

/// MIME type used when the extension does not identify an image format
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// A user-supplied file, as delivered by a file picker or drop target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name including extension
    pub name: String,
    /// Declared MIME type
    pub mime: String,
    /// File contents
    pub data: Arc<[u8]>,
}

impl ImageFile {
    /// Create a file from its parts
    pub fn new<N, M, D>(name: N, mime: M, data: D) -> Self
    where
        N: Into<String>,
        M: Into<String>,
        D: Into<Arc<[u8]>>,
    {
        Self {
            name: name.into(),
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, deriving its MIME type from the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| StudioError::file_io_error("read image file", path, &e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                StudioError::invalid_config(format!("'{}' has no file name", path.display()))
            })?;
        Ok(Self::new(name, mime_for_path(path), data))
    }

    /// Size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercased extension with leading dot, if any
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
    }
}

/// MIME type for a path according to the `image` crate's format table
#[must_use]
pub fn mime_for_path(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map_or_else(|_| UNKNOWN_MIME.to_string(), |f| f.to_mime_type().to_string())
}

/// Applies an [`IntakePolicy`] to drops
#[derive(Debug, Clone)]
pub struct IntakeFilter {
    policy: IntakePolicy,
}

impl IntakeFilter {
    #[must_use]
    pub fn new(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    /// The policy this filter enforces
    #[must_use]
    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Accept a drop, returning the single file to process.
    ///
    /// With `max_files > 1` every file must pass and the first is returned,
    /// since only one image is processed at a time.
    pub fn accept(&self, files: Vec<ImageFile>) -> std::result::Result<ImageFile, IntakeRejection> {
        if files.len() > self.policy.max_files {
            return Err(IntakeRejection::TooManyFiles {
                count: files.len(),
                max: self.policy.max_files,
            });
        }
        for file in &files {
            self.check(file)?;
        }
        files.into_iter().next().ok_or(IntakeRejection::NoFiles)
    }

    /// Check a single file against the policy
    pub fn check(&self, file: &ImageFile) -> std::result::Result<(), IntakeRejection> {
        if !self.mime_matches(&file.mime) {
            return Err(IntakeRejection::UnsupportedType {
                name: file.name.clone(),
                mime: file.mime.clone(),
            });
        }
        if !self.extension_matches(file) {
            return Err(IntakeRejection::UnsupportedExtension {
                name: file.name.clone(),
                accepted: self.policy.extensions.join(", "),
            });
        }
        if file.size() > self.policy.max_bytes {
            return Err(IntakeRejection::TooLarge {
                name: file.name.clone(),
                size: file.size(),
                max: self.policy.max_bytes,
            });
        }
        Ok(())
    }

    fn mime_matches(&self, mime: &str) -> bool {
        let mime = mime.trim().to_lowercase();
        let pattern = self.policy.mime_pattern.to_lowercase();
        match pattern.strip_suffix("/*") {
            Some(kind) => mime
                .split_once('/')
                .is_some_and(|(k, subtype)| k == kind && !subtype.is_empty()),
            None => mime == pattern,
        }
    }

    fn extension_matches(&self, file: &ImageFile) -> bool {
        file.extension().is_some_and(|ext| {
            self.policy
                .extensions
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(&ext))
        })
    }
}

impl Default for IntakeFilter {
    fn default() -> Self {
        Self::new(IntakePolicy::default())
    }
}
