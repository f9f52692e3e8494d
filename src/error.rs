//! Error types for the `framegrab` crate.
//!
//! This module defines [`CaptureError`], the unified error type returned by
//! all fallible operations in the crate. Variants map one-to-one onto the
//! failure kinds a caller is expected to branch on — a missing player, a
//! denied gallery write, an elapsed write budget — and carry enough context
//! to diagnose the problem without additional logging at the call site.
//!
//! Frame-extraction failures are deliberately absent: a failed strategy
//! chain degrades to a synthesized placeholder frame (see
//! [`crate::placeholder`]) and never surfaces as an error.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framegrab` operations.
///
/// Every public method that can fail returns `Result<T, CaptureError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CaptureError {
    /// No player is registered under the requested id.
    ///
    /// Returned when the id was never registered, or when the host has
    /// already issued the corresponding removal lifecycle call.
    #[error("No player registered under id {id:?}")]
    PlayerNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The player exists but has no loaded media item.
    #[error("Player has no current media item")]
    NoCurrentMedia,

    /// The video's natural dimensions have not been resolved yet.
    ///
    /// Typically transient — metadata becomes available once buffering
    /// completes.
    #[error("Video dimensions are not available yet")]
    DimensionsUnavailable,

    /// Converting the captured frame to the requested image format failed.
    ///
    /// Always fatal to the request, unlike extraction failures which are
    /// recovered via the placeholder fallback.
    #[error("Failed to encode frame: {0}")]
    Encoding(String),

    /// A shared-store write was requested without prior authorization.
    ///
    /// The write is never attempted; callers may re-request permission and
    /// retry.
    #[error("Shared media store access has not been authorized")]
    PermissionDenied,

    /// Writing the encoded image to a filesystem path failed.
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        /// The path that could not be created or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// A shared-store write did not complete within its time budget.
    #[error("Shared store write exceeded its {budget:?} budget")]
    Timeout {
        /// The budget that was exceeded.
        budget: Duration,
    },

    /// An I/O error outside of a specific filesystem write.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl From<ImageError> for CaptureError {
    fn from(error: ImageError) -> Self {
        CaptureError::Encoding(error.to_string())
    }
}
