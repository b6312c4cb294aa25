//! Image ingestion: decode a user-selected photo, downsample it to a maximum
//! dimension, and re-encode it as a fixed-quality JPEG ready for upload.
//!
//! Re-encoding goes through raw pixels, so every embedded metadata field
//! (GPS tags, camera info, orientation) is dropped on the floor. That is the
//! point, not a side effect: uploads must never leak where the photo was
//! taken beyond what the visitor chooses to share.

use chrono::Utc;
use image::ImageReader;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("please choose an image file (`{0}` is not one)")]
    InvalidInput(String),
    #[error("could not read photo: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode photo: {0}")]
    Decode(image::ImageError),
    #[error("could not encode photo: {0}")]
    Encode(image::ImageError),
}

/// A resized, re-encoded, metadata-free derivative of a submitted photo.
/// Transient: staged for exactly one upload, then discarded.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// MIME types accepted from the picker, keyed by extension. Anything else is
/// rejected before the file is even opened.
fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Normalize a photo from disk. Fails with `InvalidInput` for non-image
/// paths without touching the filesystem.
pub async fn normalize_file(
    path: &Path,
    max_dimension: u32,
    quality: u8,
) -> Result<NormalizedImage, NormalizeError> {
    if content_type_for(path).is_none() {
        return Err(NormalizeError::InvalidInput(path.display().to_string()));
    }
    let bytes = tokio::fs::read(path).await?;
    normalize_bytes(&bytes, max_dimension, quality)
}

/// Decode, downscale, and re-encode an in-memory image.
pub fn normalize_bytes(
    bytes: &[u8],
    max_dimension: u32,
    quality: u8,
) -> Result<NormalizedImage, NormalizeError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
        .map_err(NormalizeError::Decode)?;

    let (width, height) = scaled_dimensions(img.width(), img.height(), max_dimension);
    let scaled = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel, and flattening to RGB8 is also what
    // guarantees no source metadata survives into the output.
    let rgb = scaled.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(&rgb)
        .map_err(NormalizeError::Encode)?;

    Ok(NormalizedImage {
        file_name: generated_name(),
        content_type: "image/jpeg",
        bytes: out.into_inner(),
        width,
        height,
    })
}

/// Scale factor is min(1, max / largest side): photos are never upscaled,
/// and an oversized photo's larger side lands exactly on `max_dimension`.
fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let largest = width.max(height);
    if largest <= max_dimension || largest == 0 {
        return (width, height);
    }
    let scale = max_dimension as f64 / largest as f64;
    let scaled_w = ((width as f64 * scale).round() as u32).max(1);
    let scaled_h = ((height as f64 * scale).round() as u32).max(1);
    (scaled_w, scaled_h)
}

/// Upload names only need to be unique within one tag's storage prefix;
/// millisecond timestamp plus a random suffix is plenty.
fn generated_name() -> String {
    format!(
        "{}_{:08x}.jpg",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}
