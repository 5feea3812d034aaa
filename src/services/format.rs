//! Output format handling service
//!
//! Processed results are always delivered as PNG so the transparency
//! produced by the removal survives download.

use crate::error::{Result, StudioError};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// MIME type of every processed result
pub const PROCESSED_MIME: &str = "image/png";

/// Service that turns a capability payload into PNG bytes
pub struct PngNormalizer;

impl PngNormalizer {
    /// Return `payload` as PNG.
    ///
    /// PNG payloads pass through untouched. Any other format the `image`
    /// crate can decode is re-encoded as RGBA PNG.
    ///
    /// # Errors
    /// - Empty payload
    /// - Payload that is not a decodable image
    pub fn ensure_png(payload: &[u8]) -> Result<Vec<u8>> {
        if payload.is_empty() {
            return Err(StudioError::removal(
                "Background removal returned an empty image",
            ));
        }

        match image::guess_format(payload) {
            Ok(ImageFormat::Png) => Ok(payload.to_vec()),
            Ok(format) => {
                log::debug!("Re-encoding {:?} result as PNG", format);
                let decoded = image::load_from_memory_with_format(payload, format)?;
                Self::encode(&DynamicImage::ImageRgba8(decoded.to_rgba8()))
            },
            Err(e) => Err(StudioError::removal(format!(
                "Background removal returned data that is not an image: {}",
                e
            ))),
        }
    }

    /// Encode an image as PNG bytes
    pub fn encode(image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    /// Whether a PNG payload carries an alpha channel
    #[must_use]
    pub fn has_alpha(payload: &[u8]) -> bool {
        image::load_from_memory_with_format(payload, ImageFormat::Png)
            .map(|img| img.color().has_alpha())
            .unwrap_or(false)
    }
}
