//! File export service
//!
//! Mirrors what a browser does with a download: the file lands in the
//! target directory under its suggested name, and when that name is taken
//! a ` (n)` suffix is inserted before the extension.

use crate::error::{Result, StudioError};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Upper bound on ` (n)` suffixes tried before giving up
const MAX_DUPLICATE_SUFFIX: u32 = 10_000;

/// Service for writing exported files
pub struct ExportService;

impl ExportService {
    /// Write `data` into `dir` under `file_name`, or the first free
    /// `name (n).ext` variant
    ///
    /// # Returns
    /// The path that was written
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgremove_studio::services::ExportService;
    ///
    /// let path = ExportService::save_unique("downloads", "processed-image.png", b"...")?;
    /// println!("saved {}", path.display());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_unique<P: AsRef<Path>>(dir: P, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .map_err(|e| StudioError::file_io_error("create output directory", dir, &e))?;

        for path in Self::candidates(dir, file_name) {
            // create_new fails instead of truncating a file that appeared meanwhile
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StudioError::file_io_error("create download", &path, &e)),
            };
            file.write_all(data)
                .map_err(|e| StudioError::file_io_error("write download", &path, &e))?;
            log::debug!("Saved {} bytes to {}", data.len(), path.display());
            return Ok(path);
        }

        Err(StudioError::internal(format!(
            "No free file name for '{}' in {}",
            file_name,
            dir.display()
        )))
    }

    /// `file_name`, then `stem (1).ext` up to the suffix limit
    fn candidates<'a>(dir: &'a Path, file_name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        let name = Path::new(file_name);
        let stem = name
            .file_stem()
            .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());
        let extension = name
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        std::iter::once(dir.join(file_name)).chain(
            (1..=MAX_DUPLICATE_SUFFIX)
                .map(move |n| dir.join(format!("{} ({}){}", stem, n, extension))),
        )
    }
}
