//! # framegrab
//!
//! Embeddable frame-capture engine for live video players — extract,
//! encode, and route still frames.
//!
//! `framegrab` lets a host video-playback environment expose "take a
//! screenshot of whatever this player is currently showing" as an
//! imperative operation. The host registers its live players and supplies
//! two platform bindings — a [`FrameRetriever`] that can pull stills out
//! of its media framework and (optionally) a [`SharedMediaStore`] for
//! gallery writes — and the engine handles the rest: player tracking, an
//! ordered multi-strategy extraction chain with a deterministic
//! placeholder fallback, aspect-preserving resize and JPEG/PNG encoding,
//! and three-way output dispatch (in-memory base64, shared store, or a
//! filesystem path).
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use image::RgbImage;
//! use framegrab::{
//!     CaptureError, ExtractionStrategy, FrameRetriever, MediaSource, PlayerHandle,
//!     ScreenshotEngine, ScreenshotRequest,
//! };
//!
//! // The host's view of one live player.
//! struct HostPlayer;
//!
//! impl PlayerHandle for HostPlayer {
//!     fn position(&self) -> Option<Duration> { Some(Duration::from_secs(12)) }
//!     fn duration(&self) -> Option<Duration> { Some(Duration::from_secs(90)) }
//!     fn dimensions(&self) -> Option<(u32, u32)> { Some((1280, 720)) }
//!     fn is_ready(&self) -> bool { true }
//!     fn media_source(&self) -> Option<MediaSource> {
//!         Some(MediaSource::Uri("https://example.com/clip.mp4".into()))
//!     }
//! }
//!
//! // The host's binding to its media framework.
//! struct HostRetriever;
//!
//! impl FrameRetriever for HostRetriever {
//!     fn open(&mut self, _source: &MediaSource) -> Result<(), CaptureError> { Ok(()) }
//!     fn retrieve(
//!         &mut self,
//!         _strategy: ExtractionStrategy,
//!         _target: Duration,
//!         _tolerance: Duration,
//!     ) -> Option<RgbImage> {
//!         Some(RgbImage::new(1280, 720))
//!     }
//!     fn reset(&mut self) {}
//! }
//!
//! # async fn example() -> Result<(), CaptureError> {
//! let engine = ScreenshotEngine::builder(|| Box::new(HostRetriever)).build();
//!
//! // Host lifecycle callbacks keep the registry current.
//! engine.on_player_created("main", Arc::new(HostPlayer));
//!
//! // Capture in-memory, downscaled to fit 640x480, as base64 JPEG.
//! let request = ScreenshotRequest::new().with_max_dimensions(640, 480);
//! let shot = engine.capture_screenshot("main", &request).await?;
//! assert_eq!((shot.width, shot.height), (640, 360));
//!
//! // Or persist straight to disk (parent directories created on demand).
//! let saved = engine.save_to_path("main", "/tmp/shots/latest.jpg", &request).await?;
//! assert!(saved.byte_size.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Degradation, not failure
//!
//! Extraction runs an ordered chain of six strategies (keyframe-aligned
//! first, progressively more permissive) with a strict-then-relaxed
//! tolerance retry. If the media framework cannot deliver any frame —
//! still buffering, DRM, no media item — the engine synthesizes a
//! deterministic placeholder sized to the best-known video dimensions and
//! returns it as a *successful* result with its `placeholder` flag set.
//! Only post-extraction problems (encoding, permissions, filesystem,
//! write timeouts) surface as errors, each as a distinct
//! [`CaptureError`] variant callers can branch on.
//!
//! ## Threading model
//!
//! Player-state reads are marshaled onto the host's [`AffinityContext`]
//! (many platforms confine player objects to a UI thread); extraction,
//! resizing, and encoding run on Tokio blocking workers; frame-retrieval
//! sessions are recycled through a small bounded [`ResourcePool`].
//! Concurrent requests are independent — no ordering is guaranteed
//! between them, even against the same player.

pub mod engine;
pub mod error;
pub mod extractor;
pub mod output;
pub mod placeholder;
pub mod player;
pub mod pool;
pub mod processor;
pub mod registry;
pub mod request;

pub use engine::{EngineBuilder, ScreenshotEngine};
pub use error::CaptureError;
pub use extractor::{
    CapturedFrame, ExtractionStrategy, FrameRetriever, RELAXED_TOLERANCE, STRATEGY_CHAIN,
    STRICT_TOLERANCE,
};
pub use output::{DEFAULT_STORE_TIMEOUT, SharedMediaStore, UnauthorizedStore};
pub use player::{
    AffinityContext, InlineAffinity, MediaSource, PlayerHandle, PlayerId, PlayerState,
};
pub use pool::{PooledItem, ResourcePool};
pub use registry::PlayerRegistry;
pub use request::{
    Destination, ImageFormat, ScreenshotRequest, ScreenshotResult, VideoDimensions,
};
