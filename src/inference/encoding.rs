//! Frame normalization: decode whatever the camera sent and re-encode it
//! as baseline JPEG for the vision API.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::{AppError, Result};

/// Decode `bytes` (JPEG, PNG, or WebP) and re-encode as RGB JPEG.
///
/// `quality` is clamped to the encoder's `1..=100` range.
///
/// # Errors
///
/// Returns `AppError::Image` if the bytes are not a supported image or
/// encoding fails.
pub fn to_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(AppError::Image("empty frame".into()));
    }
    let decoded = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Vec::with_capacity(bytes.len());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;
    Ok(out)
}

/// Run [`to_jpeg`] on the blocking pool.
///
/// # Errors
///
/// Returns `AppError::Image` if decoding fails or the worker panics.
pub async fn to_jpeg_blocking(bytes: Vec<u8>, quality: u8) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || to_jpeg(&bytes, quality))
        .await
        .map_err(|err| AppError::Image(format!("frame encoder task failed: {err}")))?
}
