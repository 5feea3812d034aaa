//! Removal capability abstraction

use crate::{config::RemovalOptions, error::Result, intake::ImageFile};
use async_trait::async_trait;

/// An external background-removal capability.
///
/// Implementations may be slow (seconds) and may fail for unsupported or
/// oversized inputs or internal model errors. A failure is reported as an
/// error whose message is shown to the user; it must never panic the host.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Remove the background of `file`, returning the encoded result
    ///
    /// # Errors
    /// - Unsupported or undecodable input
    /// - Capability unavailable or crashed
    /// - Internal model errors
    async fn remove(&self, file: &ImageFile, options: &RemovalOptions) -> Result<Vec<u8>>;
}
