//! Output routing for encoded screenshots.
//!
//! Three mutually exclusive modes per request: return the bytes in-memory
//! (handled entirely in [`crate::engine`]), persist into the platform's
//! shared media collection, or persist to an arbitrary filesystem path.
//! Each persisted mode has its own failure behavior:
//!
//! - Shared store: requires prior authorization; the write runs on a
//!   blocking thread under a bounded time budget, and an elapsed budget is
//!   reported as [`CaptureError::Timeout`] rather than silently dropped.
//! - Path: intermediate directories are created on demand; failures carry
//!   the offending path.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CaptureError;
use crate::request::ImageFormat;

/// Default time budget for a shared-store write.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// The platform's shared media collection (gallery-equivalent).
///
/// Implemented by the host. `save` may block — the engine always invokes
/// it from a blocking-capable thread and bounds the wait.
pub trait SharedMediaStore: Send + Sync {
    /// Whether the host currently holds write authorization for the store.
    ///
    /// Checked before every write; the engine never attempts a write
    /// without it.
    fn is_authorized(&self) -> bool;

    /// Persist encoded image bytes into the store.
    ///
    /// Returns a locator for the stored item (content URI, asset id —
    /// whatever the platform uses).
    fn save(&self, bytes: &[u8], format: ImageFormat) -> Result<String, CaptureError>;
}

/// Default store for engines built without a platform store: denies every
/// write with [`CaptureError::PermissionDenied`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnauthorizedStore;

impl SharedMediaStore for UnauthorizedStore {
    fn is_authorized(&self) -> bool {
        false
    }

    fn save(&self, _bytes: &[u8], _format: ImageFormat) -> Result<String, CaptureError> {
        Err(CaptureError::PermissionDenied)
    }
}

/// Write to the shared store under a time budget.
///
/// # Errors
///
/// [`CaptureError::PermissionDenied`] without attempting the write when
/// authorization is missing, [`CaptureError::Timeout`] when `budget`
/// elapses, or whatever the store itself reports.
pub(crate) async fn save_to_shared_store(
    store: Arc<dyn SharedMediaStore>,
    bytes: Vec<u8>,
    format: ImageFormat,
    budget: Duration,
) -> Result<String, CaptureError> {
    if !store.is_authorized() {
        log::debug!("shared store write refused: not authorized");
        return Err(CaptureError::PermissionDenied);
    }

    let write = tokio::task::spawn_blocking(move || store.save(&bytes, format));
    match tokio::time::timeout(budget, write).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => Err(CaptureError::Io(std::io::Error::other(format!(
            "shared store write aborted: {join_error}"
        )))),
        Err(_) => {
            log::warn!("shared store write exceeded its {budget:?} budget");
            Err(CaptureError::Timeout { budget })
        }
    }
}

/// Write encoded bytes to a filesystem path, creating missing parent
/// directories. Returns the number of bytes written.
pub(crate) async fn save_to_path(path: &Path, bytes: &[u8]) -> Result<u64, CaptureError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CaptureError::Filesystem {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| CaptureError::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;

    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len() as u64)
}
