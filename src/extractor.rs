//! Frame extraction against the host's media framework.
//!
//! Extraction is an ordered chain of [`ExtractionStrategy`] attempts run
//! against a host-supplied [`FrameRetriever`]. Each strategy is one way of
//! asking the media framework for a still frame near the target time,
//! ordered from cheapest/closest to most desperate. The first frame any
//! strategy yields wins.
//!
//! Time-targeted strategies are attempted twice: first at strict (zero)
//! tolerance for fidelity, then with a relaxed ±100 ms window before
//! falling through to the next strategy.
//!
//! When every strategy comes up empty — source unreadable, still
//! buffering, DRM-protected, no media item — extraction does **not** fail.
//! It synthesizes a deterministic placeholder frame instead (see
//! [`crate::placeholder`]) and tags the result so callers can tell the
//! difference.

use std::time::Duration;

use image::RgbImage;

use crate::error::CaptureError;
use crate::placeholder;
use crate::player::{MediaSource, PlayerState};

/// One technique for retrieving a still frame near a target time.
///
/// Mirrors the option set media frameworks commonly expose for frame
/// retrieval; the host's [`FrameRetriever`] maps each variant onto the
/// native equivalent (or returns `None` when the framework has no such
/// mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// The sync (keyframe-aligned) frame closest to the target time.
    /// Fast, may be off by up to a GOP.
    ClosestSync,
    /// The frame of any type closest to the target time. More precise,
    /// costlier — may require decoding forward from a keyframe.
    ClosestAny,
    /// The last sync frame at or before the target time.
    PreviousSync,
    /// The first sync frame after the target time.
    NextSync,
    /// Any decodable frame, wherever it sits. Time-agnostic last resort.
    AnyFrame,
    /// The first frame of the source, at time zero.
    FirstFrame,
}

impl ExtractionStrategy {
    /// Whether this strategy seeks relative to the target time.
    ///
    /// Time-agnostic strategies get a single attempt — a relaxed-tolerance
    /// retry cannot change their outcome.
    pub fn is_time_targeted(self) -> bool {
        !matches!(
            self,
            ExtractionStrategy::AnyFrame | ExtractionStrategy::FirstFrame
        )
    }

    /// The time this strategy aims at, given the playback position.
    fn target(self, position: Duration) -> Duration {
        match self {
            ExtractionStrategy::FirstFrame => Duration::ZERO,
            _ => position,
        }
    }
}

/// The strategies tried for every capture, in order.
pub const STRATEGY_CHAIN: [ExtractionStrategy; 6] = [
    ExtractionStrategy::ClosestSync,
    ExtractionStrategy::ClosestAny,
    ExtractionStrategy::PreviousSync,
    ExtractionStrategy::NextSync,
    ExtractionStrategy::AnyFrame,
    ExtractionStrategy::FirstFrame,
];

/// Tolerance used on the first attempt of each time-targeted strategy.
pub const STRICT_TOLERANCE: Duration = Duration::ZERO;

/// Tolerance used on the retry attempt of each time-targeted strategy.
pub const RELAXED_TOLERANCE: Duration = Duration::from_millis(100);

/// A frame-retrieval session against the host's media framework.
///
/// Implementations are expensive to construct (they typically wrap a
/// native decoder session), which is why the engine pools them via
/// [`ResourcePool`](crate::ResourcePool).
///
/// A retriever is used by one request at a time: `open` binds it to a
/// source, `retrieve` is called per strategy attempt, and `reset` detaches
/// the source before the instance returns to the pool.
pub trait FrameRetriever: Send {
    /// Bind this session to a media source.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoCurrentMedia`] or an I/O-flavored error when the
    /// source cannot be opened. Open failures degrade to the placeholder;
    /// they never fail the request.
    fn open(&mut self, source: &MediaSource) -> Result<(), CaptureError>;

    /// Attempt to retrieve a frame near `target` using `strategy`.
    ///
    /// `tolerance` bounds how far from `target` the returned frame may be;
    /// it is meaningless for time-agnostic strategies. Returns `None` when
    /// the framework cannot produce a frame under these constraints —
    /// that is an expected outcome, not an error.
    fn retrieve(
        &mut self,
        strategy: ExtractionStrategy,
        target: Duration,
        tolerance: Duration,
    ) -> Option<RgbImage>;

    /// Detach from the current source, keeping the session reusable.
    fn reset(&mut self);
}

/// A decoded still frame, fresh out of extraction.
///
/// Ephemeral: owned by the in-flight request and released after encoding.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw RGB pixel data.
    pub image: RgbImage,
    /// `true` when the frame was synthesized because every extraction
    /// strategy failed.
    pub placeholder: bool,
}

impl CapturedFrame {
    /// Width of the captured image in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the captured image in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Run the strategy chain against `retriever` for the player state in
/// `state`.
///
/// Infallible by design: if no strategy yields a frame, a placeholder
/// sized to the best-known dimensions is returned with its `placeholder`
/// flag set.
pub fn extract_frame(retriever: &mut dyn FrameRetriever, state: &PlayerState) -> CapturedFrame {
    match &state.source {
        Some(source) => match retriever.open(source) {
            Ok(()) => {
                let position = state.position.unwrap_or(Duration::ZERO);
                for strategy in STRATEGY_CHAIN {
                    let target = strategy.target(position);
                    if let Some(image) = retriever.retrieve(strategy, target, STRICT_TOLERANCE) {
                        log::debug!("{strategy:?} produced a frame at strict tolerance");
                        return CapturedFrame {
                            image,
                            placeholder: false,
                        };
                    }
                    if strategy.is_time_targeted() {
                        if let Some(image) = retriever.retrieve(strategy, target, RELAXED_TOLERANCE)
                        {
                            log::debug!("{strategy:?} produced a frame at relaxed tolerance");
                            return CapturedFrame {
                                image,
                                placeholder: false,
                            };
                        }
                    }
                    log::debug!("{strategy:?} produced no frame, falling through");
                }
            }
            Err(error) => {
                log::debug!("retriever could not open media source: {error}");
            }
        },
        None => {
            log::debug!("player has no current media item");
        }
    }

    log::warn!("all extraction strategies failed, synthesizing placeholder frame");
    CapturedFrame {
        image: placeholder::synthesize(state),
        placeholder: true,
    }
}
