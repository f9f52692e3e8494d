//! The screenshot engine: orchestration of registry, extraction,
//! processing, and output routing.
//!
//! [`ScreenshotEngine`] is the long-lived object a host embeds once per
//! process. The host feeds it player lifecycle events
//! ([`on_player_created`](ScreenshotEngine::on_player_created) /
//! [`on_player_removed`](ScreenshotEngine::on_player_removed)) and issues
//! capture operations against registered ids.
//!
//! Every capture follows the same pipeline: registry lookup → player-state
//! snapshot marshaled through the host's [`AffinityContext`] → extraction,
//! resize, and encode on a blocking worker thread → per-mode output
//! dispatch. The expensive stages never run on the host's constrained
//! context, and concurrent requests are not serialized against each other
//! — each one reads the player's state independently at the moment it
//! runs.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CaptureError;
use crate::extractor::{self, FrameRetriever};
use crate::output::{self, DEFAULT_STORE_TIMEOUT, SharedMediaStore, UnauthorizedStore};
use crate::player::{self, AffinityContext, InlineAffinity, PlayerHandle, PlayerId};
use crate::pool::ResourcePool;
use crate::processor;
use crate::registry::PlayerRegistry;
use crate::request::{Destination, ScreenshotRequest, ScreenshotResult, VideoDimensions};

/// Builder for [`ScreenshotEngine`].
///
/// Obtained via [`ScreenshotEngine::builder`]. Everything except the
/// retriever factory has a usable default: inline affinity (no thread
/// constraint), a store that denies all writes, pool capacity 3, and a
/// 10-second shared-store write budget.
#[must_use]
pub struct EngineBuilder {
    factory: Box<dyn Fn() -> Box<dyn FrameRetriever> + Send + Sync>,
    registry: Option<Arc<PlayerRegistry>>,
    affinity: Arc<dyn AffinityContext>,
    store: Arc<dyn SharedMediaStore>,
    pool_capacity: usize,
    store_timeout: Duration,
}

impl EngineBuilder {
    /// Use an externally owned registry.
    ///
    /// Useful when the component receiving host lifecycle callbacks is not
    /// the one issuing capture calls — both can share one registry.
    pub fn with_registry(mut self, registry: Arc<PlayerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the execution context on which player state is read.
    pub fn with_affinity(mut self, affinity: Arc<dyn AffinityContext>) -> Self {
        self.affinity = affinity;
        self
    }

    /// Set the platform's shared media store.
    pub fn with_shared_store(mut self, store: Arc<dyn SharedMediaStore>) -> Self {
        self.store = store;
        self
    }

    /// Set how many idle frame retrievers the pool retains. Defaults to 3.
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Set the time budget for shared-store writes. Defaults to 10 s.
    pub fn with_store_timeout(mut self, budget: Duration) -> Self {
        self.store_timeout = budget;
        self
    }

    /// Build the engine.
    pub fn build(self) -> ScreenshotEngine {
        ScreenshotEngine {
            registry: self.registry.unwrap_or_default(),
            pool: ResourcePool::new(self.pool_capacity, self.factory),
            affinity: self.affinity,
            store: self.store,
            store_timeout: self.store_timeout,
        }
    }
}

/// Everything the output dispatch stage needs, produced by the capture
/// pipeline on a worker thread.
struct EncodedCapture {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    placeholder: bool,
    timestamp: Option<f64>,
}

/// The frame-capture engine.
///
/// Cheap to share behind an [`Arc`]; all operations take `&self`. See the
/// crate-level documentation for a complete usage example.
pub struct ScreenshotEngine {
    registry: Arc<PlayerRegistry>,
    pool: ResourcePool<Box<dyn FrameRetriever>>,
    affinity: Arc<dyn AffinityContext>,
    store: Arc<dyn SharedMediaStore>,
    store_timeout: Duration,
}

impl ScreenshotEngine {
    /// Start building an engine around a frame-retriever factory.
    ///
    /// The factory constructs the host's platform-specific retrieval
    /// sessions; the engine pools them (see
    /// [`ResourcePool`](crate::ResourcePool)) and calls it only when the
    /// pool has no idle instance.
    pub fn builder(
        factory: impl Fn() -> Box<dyn FrameRetriever> + Send + Sync + 'static,
    ) -> EngineBuilder {
        EngineBuilder {
            factory: Box::new(factory),
            registry: None,
            affinity: Arc::new(InlineAffinity),
            store: Arc::new(UnauthorizedStore),
            pool_capacity: 3,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Host lifecycle: a player became available.
    ///
    /// Call exactly once per live player.
    pub fn on_player_created(&self, id: impl Into<PlayerId>, handle: Arc<dyn PlayerHandle>) {
        self.registry.register(id, handle);
    }

    /// Host lifecycle: a player was torn down.
    ///
    /// Idempotent; unknown ids are ignored.
    pub fn on_player_removed(&self, id: &str) {
        self.registry.unregister(id);
    }

    /// The registry backing this engine.
    pub fn registry(&self) -> Arc<PlayerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Number of currently registered players.
    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    /// Capture a screenshot and return it in-memory, base64-framed.
    ///
    /// # Errors
    ///
    /// [`CaptureError::PlayerNotFound`] for unknown ids,
    /// [`CaptureError::Encoding`] when format conversion fails. Extraction
    /// failure is not an error — the result carries a placeholder frame
    /// with its `placeholder` flag set.
    pub async fn capture_screenshot(
        &self,
        id: &str,
        request: &ScreenshotRequest,
    ) -> Result<ScreenshotResult, CaptureError> {
        let capture = self.capture_encoded(id, request).await?;
        Ok(ScreenshotResult {
            width: capture.width,
            height: capture.height,
            format: request.format,
            base64: Some(processor::to_base64(&capture.bytes)),
            timestamp: capture.timestamp,
            destination: None,
            byte_size: None,
            placeholder: capture.placeholder,
        })
    }

    /// Capture a screenshot and persist it into the shared media store.
    ///
    /// The result carries the store's locator and the encoded byte size;
    /// no base64 payload is produced.
    ///
    /// # Errors
    ///
    /// Everything [`capture_screenshot`](Self::capture_screenshot) can
    /// return, plus [`CaptureError::PermissionDenied`] when store access
    /// is not authorized (the write is never attempted) and
    /// [`CaptureError::Timeout`] when the write exceeds its budget.
    pub async fn save_to_shared_store(
        &self,
        id: &str,
        request: &ScreenshotRequest,
    ) -> Result<ScreenshotResult, CaptureError> {
        let capture = self.capture_encoded(id, request).await?;
        let byte_size = capture.bytes.len() as u64;
        let locator = output::save_to_shared_store(
            Arc::clone(&self.store),
            capture.bytes,
            request.format,
            self.store_timeout,
        )
        .await?;

        Ok(ScreenshotResult {
            width: capture.width,
            height: capture.height,
            format: request.format,
            base64: None,
            timestamp: capture.timestamp,
            destination: Some(Destination::SharedStore(locator)),
            byte_size: Some(byte_size),
            placeholder: capture.placeholder,
        })
    }

    /// Capture a screenshot and persist it to a filesystem path.
    ///
    /// Missing parent directories are created. The result carries the
    /// path and the exact number of bytes written.
    ///
    /// # Errors
    ///
    /// Everything [`capture_screenshot`](Self::capture_screenshot) can
    /// return, plus [`CaptureError::Filesystem`] when directory creation
    /// or the write fails.
    pub async fn save_to_path(
        &self,
        id: &str,
        path: impl AsRef<Path>,
        request: &ScreenshotRequest,
    ) -> Result<ScreenshotResult, CaptureError> {
        let path = path.as_ref();
        let capture = self.capture_encoded(id, request).await?;
        let byte_size = output::save_to_path(path, &capture.bytes).await?;

        Ok(ScreenshotResult {
            width: capture.width,
            height: capture.height,
            format: request.format,
            base64: None,
            timestamp: capture.timestamp,
            destination: Some(Destination::Path(path.to_path_buf())),
            byte_size: Some(byte_size),
            placeholder: capture.placeholder,
        })
    }

    /// Whether a capture against `id` can currently produce a genuine
    /// frame: the player is registered, ready, and has a media source.
    ///
    /// Never errors; unknown ids return `false`.
    pub async fn is_capture_supported(&self, id: &str) -> bool {
        let Some(handle) = self.registry.lookup(id) else {
            return false;
        };
        let state = player::read_state(self.affinity.as_ref(), handle).await;
        state.ready && state.source.is_some()
    }

    /// The natural dimensions of the video `id` is presenting.
    ///
    /// # Errors
    ///
    /// [`CaptureError::PlayerNotFound`] for unknown ids,
    /// [`CaptureError::DimensionsUnavailable`] while the media's metadata
    /// is unresolved.
    pub async fn video_dimensions(&self, id: &str) -> Result<VideoDimensions, CaptureError> {
        let handle = self.lookup(id)?;
        let state = player::read_state(self.affinity.as_ref(), handle).await;
        state
            .dimensions
            .map(|(width, height)| VideoDimensions { width, height })
            .ok_or(CaptureError::DimensionsUnavailable)
    }

    /// Snapshot of the currently registered player ids.
    ///
    /// Never errors.
    pub fn list_available_players(&self) -> Vec<PlayerId> {
        self.registry.ids()
    }

    fn lookup(&self, id: &str) -> Result<Arc<dyn PlayerHandle>, CaptureError> {
        self.registry
            .lookup(id)
            .ok_or_else(|| CaptureError::PlayerNotFound { id: id.to_string() })
    }

    /// The shared pipeline: lookup, affinity-marshaled state snapshot,
    /// then extraction + resize + encode on a blocking worker.
    async fn capture_encoded(
        &self,
        id: &str,
        request: &ScreenshotRequest,
    ) -> Result<EncodedCapture, CaptureError> {
        let handle = self.lookup(id)?;
        let state = player::read_state(self.affinity.as_ref(), handle).await;

        let pool = self.pool.clone();
        let request = request.clone();
        let worker = tokio::task::spawn_blocking(move || -> Result<EncodedCapture, CaptureError> {
            let timestamp = if request.include_timestamp {
                state.position.map(|position| position.as_secs_f64())
            } else {
                None
            };

            let mut retriever = pool.acquire();
            let frame = extractor::extract_frame(&mut **retriever, &state);
            retriever.reset();
            drop(retriever); // back to the pool before the encode

            let placeholder = frame.placeholder;
            let image = processor::resize_to_fit(frame.image, request.max_width, request.max_height);
            let bytes = processor::encode(&image, request.format, request.quality)?;

            Ok(EncodedCapture {
                width: image.width(),
                height: image.height(),
                bytes,
                placeholder,
                timestamp,
            })
        });

        worker.await.map_err(|join_error| {
            CaptureError::Io(std::io::Error::other(format!(
                "capture worker aborted: {join_error}"
            )))
        })?
    }
}
