//! Image post-processing: resize, encode, base64 framing.
//!
//! The processor takes the captured pixel buffer through an
//! aspect-preserving downscale (never an upscale) and encodes it in the
//! requested format. Encoding failure is a hard error — unlike extraction,
//! there is no degraded fallback past this point.

use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, RgbImage,
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
    imageops::FilterType,
};

use crate::error::CaptureError;
use crate::request::ImageFormat;

/// Compute the downscaled dimensions that fit `width`×`height` within the
/// given constraints.
///
/// A constraint of `0` leaves that axis unbounded. Returns `None` when the
/// image already fits (`scale >= 1.0`) — the processor never upscales.
/// Otherwise both axes are scaled by the same factor, preserving the
/// aspect ratio exactly up to integer rounding, and clamped to at least
/// one pixel.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }

    let width_scale = if max_width == 0 {
        f64::INFINITY
    } else {
        max_width as f64 / width as f64
    };
    let height_scale = if max_height == 0 {
        f64::INFINITY
    } else {
        max_height as f64 / height as f64
    };

    let scale = width_scale.min(height_scale).min(1.0);
    if scale >= 1.0 {
        return None;
    }

    let scaled_width = ((width as f64 * scale).round() as u32).max(1);
    let scaled_height = ((height as f64 * scale).round() as u32).max(1);
    Some((scaled_width, scaled_height))
}

/// Downscale `image` to fit within the given constraints, if necessary.
///
/// Returns the image unmodified when no constraint applies. Uses a
/// triangle filter — a good quality/speed balance for thumbnails.
pub fn resize_to_fit(image: RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    match fit_within(image.width(), image.height(), max_width, max_height) {
        Some((width, height)) => {
            log::debug!(
                "downscaling {}x{} -> {width}x{height}",
                image.width(),
                image.height()
            );
            DynamicImage::ImageRgb8(image)
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgb8()
        }
        None => image,
    }
}

/// Encode `image` in the requested format.
///
/// `quality` applies to lossy formats only, mapped from `[0.0, 1.0]` onto
/// the encoder's native 1–100 scale; lossless formats ignore it.
///
/// # Errors
///
/// [`CaptureError::Encoding`] when the underlying encoder fails.
pub fn encode(
    image: &RgbImage,
    format: ImageFormat,
    quality: f32,
) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality)).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
        ImageFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(bytes)
}

/// Frame encoded bytes as base64 text for in-memory results.
pub fn to_base64(bytes: &[u8]) -> String {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    STANDARD.encode(bytes)
}

/// Map a `[0.0, 1.0]` quality onto JPEG's 1–100 scale.
///
/// Out-of-range input is clamped rather than rejected; the floor of 1
/// matters because the encoder treats quality as a positive percentage.
fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

#[cfg(test)]
mod tests {
    use super::jpeg_quality;

    #[test]
    fn quality_mapping_clamps_and_floors() {
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(-3.0), 1);
        assert_eq!(jpeg_quality(0.9), 90);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(7.5), 100);
    }
}
