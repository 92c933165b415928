//! HEIC/HEIF → baseline JPEG.
//!
//! HEIC photos (the iPhone default) are HEVC-encoded and need a native
//! codec to decode; that capability sits behind the `heic` cargo feature
//! so the default build stays pure-Rust. Without the feature the converter
//! resolves to the recoverable `Failed` state: the file is a supported
//! kind, its conversion just did not complete, and the download fallback
//! still works.
//!
//! The re-encode target is baseline JPEG at quality 80: universally
//! displayable, and photographic content tolerates the loss.

use crate::error::ConvertError;

/// JPEG quality for the re-encoded preview.
#[cfg(feature = "heic")]
const JPEG_QUALITY: u8 = 80;

/// Decode HEIC bytes and re-encode as baseline JPEG.
#[cfg(feature = "heic")]
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, ConvertError> {
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, RgbImage};
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
    use tracing::debug;

    let heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).map_err(heic_err)?;
    let handle = ctx.primary_image_handle().map_err(heic_err)?;
    let decoded = heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(heic_err)?;

    let planes = decoded.planes();
    let interleaved = planes.interleaved.ok_or_else(|| ConvertError::Heic {
        detail: "decoder produced no interleaved plane".to_string(),
    })?;

    let width = interleaved.width;
    let height = interleaved.height;
    let stride = interleaved.stride;

    // Rows can be padded to the stride; repack tightly for the encoder.
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in 0..height as usize {
        let start = row * stride;
        rgb.extend_from_slice(&interleaved.data[start..start + (width as usize) * 3]);
    }

    let img = RgbImage::from_raw(width, height, rgb).ok_or_else(|| ConvertError::Heic {
        detail: "decoded dimensions do not match pixel data".to_string(),
    })?;

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| ConvertError::Heic {
            detail: format!("jpeg encode failed: {e}"),
        })?;

    debug!(width, height, jpeg_len = jpeg.len(), "heic converted");
    Ok(jpeg)
}

#[cfg(feature = "heic")]
fn heic_err(e: libheif_rs::HeifError) -> ConvertError {
    ConvertError::Heic {
        detail: e.to_string(),
    }
}

/// Codec-less build: always a recoverable failure.
#[cfg(not(feature = "heic"))]
pub fn to_jpeg(_bytes: &[u8]) -> Result<Vec<u8>, ConvertError> {
    Err(ConvertError::Heic {
        detail: "no HEIC codec in this build (enable the `heic` feature)".to_string(),
    })
}
