//! Request and result types.
//!
//! [`ScreenshotRequest`] is the options schema shared with the host's call
//! surface, so it derives `Deserialize` with camelCase field names and
//! per-field defaults — an empty JSON object is a valid request.
//! [`ScreenshotResult`] is the mirror-image `Serialize` payload.
//!
//! # Example
//!
//! ```
//! use framegrab::{ImageFormat, ScreenshotRequest};
//!
//! // From the wire:
//! let request: ScreenshotRequest =
//!     serde_json::from_str(r#"{"format": "png", "maxWidth": 640}"#).unwrap();
//! assert_eq!(request.format, ImageFormat::Png);
//! assert_eq!(request.max_height, 0); // unconstrained
//!
//! // Or built directly:
//! let request = ScreenshotRequest::new()
//!     .with_format(ImageFormat::Jpeg)
//!     .with_quality(0.8)
//!     .with_max_dimensions(1280, 720);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Encoded image format for screenshot output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossy JPEG. The default.
    #[default]
    Jpeg,
    /// Lossless PNG. The quality setting is ignored.
    Png,
}

impl ImageFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    /// MIME type for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Whether encoding in this format discards information.
    pub fn is_lossy(self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }
}

/// Options for a single screenshot request.
///
/// All fields are optional on the wire; missing fields take the documented
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[must_use]
pub struct ScreenshotRequest {
    /// Output image format. Defaults to JPEG.
    pub format: ImageFormat,
    /// Encoding quality in `[0.0, 1.0]`, meaningful for lossy formats
    /// only. Defaults to 0.9. Values outside the range are clamped at
    /// encode time.
    pub quality: f32,
    /// Maximum output width in pixels. `0` means unconstrained.
    pub max_width: u32,
    /// Maximum output height in pixels. `0` means unconstrained.
    pub max_height: u32,
    /// Whether to include the playback position in the result.
    /// Defaults to `true`.
    pub include_timestamp: bool,
}

impl Default for ScreenshotRequest {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            quality: 0.9,
            max_width: 0,
            max_height: 0,
            include_timestamp: true,
        }
    }
}

impl ScreenshotRequest {
    /// Create a request with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output image format.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the lossy-encoding quality in `[0.0, 1.0]`.
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    /// Constrain the output dimensions. `0` leaves an axis unconstrained.
    pub fn with_max_dimensions(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    /// Control whether the playback position is included in the result.
    pub fn with_include_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }
}

/// Where a persisted screenshot ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Destination {
    /// Locator within the platform's shared media collection.
    SharedStore(String),
    /// Filesystem path the image was written to.
    Path(PathBuf),
}

/// The outcome of a successful screenshot operation.
///
/// `width`/`height` always describe the encoded image — post-resize when a
/// constraint applied, the capture dimensions otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotResult {
    /// Final image width in pixels.
    pub width: u32,
    /// Final image height in pixels.
    pub height: u32,
    /// Format the image was encoded in.
    pub format: ImageFormat,
    /// Base64 framing of the encoded bytes. Present for in-memory
    /// results, absent for persisted outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    /// Playback position in seconds at capture time, when requested and
    /// known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Where the image was persisted, for the two save modes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    /// Encoded size in bytes, reported for persisted outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<u64>,
    /// `true` when the image is a synthesized placeholder rather than a
    /// genuine frame. Informational — a placeholder is still a success.
    pub placeholder: bool,
}

impl ScreenshotResult {
    /// Decode the base64 payload back to raw bytes.
    ///
    /// `None` when this result has no in-memory payload (persisted
    /// outputs) or the payload is not valid base64.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        self.base64.as_ref().and_then(|text| STANDARD.decode(text).ok())
    }
}

/// A video's natural dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}
