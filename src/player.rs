//! Host player integration.
//!
//! The engine never owns a video player — it reads state from live player
//! instances owned by the host environment. This module defines the two
//! traits the host implements to grant that access:
//!
//! - [`PlayerHandle`] — a non-owning view of one live player: playback
//!   position, natural dimensions, readiness, and the media source the
//!   frame retriever can decode from.
//! - [`AffinityContext`] — the execution context on which those reads are
//!   safe. Many host platforms only allow player-state reads on a specific
//!   (usually "main" or "UI") thread; the engine marshals every read
//!   through this trait and ships a plain [`PlayerState`] snapshot back to
//!   its worker threads.
//!
//! Hosts without a thread-affinity constraint can use [`InlineAffinity`],
//! which runs reads on the calling thread.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

/// Identifier for a live player, assigned by the host.
///
/// Unique per live player; the host may reuse an id only after issuing the
/// corresponding removal lifecycle call.
pub type PlayerId = String;

/// Descriptor of the media a player is presenting.
///
/// Opaque to the engine — it is handed unmodified to the host's
/// [`FrameRetriever`](crate::FrameRetriever), which knows how to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A URI (file path, network URL, asset reference).
    Uri(String),
    /// An opaque numeric handle into the host's media framework.
    Handle(u64),
}

/// A non-owning view of a live player instance.
///
/// Implemented by the host and registered via
/// [`ScreenshotEngine::on_player_created`](crate::ScreenshotEngine::on_player_created).
/// All methods are reads; the engine never drives playback.
///
/// Methods on this trait are only invoked from the host's
/// [`AffinityContext`] — implementations may assume they run on whatever
/// thread that context dispatches to.
pub trait PlayerHandle: Send + Sync {
    /// Current playback position, if a media item is loaded.
    fn position(&self) -> Option<Duration>;

    /// Total duration of the current media item, if known.
    fn duration(&self) -> Option<Duration>;

    /// Natural video dimensions `(width, height)`.
    ///
    /// `None` until the media's metadata has been resolved (e.g. while
    /// still buffering).
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Whether the player is ready to present frames.
    fn is_ready(&self) -> bool;

    /// The media source the player is presenting, if any.
    fn media_source(&self) -> Option<MediaSource>;
}

/// A plain, copyable snapshot of a player's state.
///
/// Taken on the [`AffinityContext`] in a single pass, then moved across
/// threads freely. Everything the extraction pipeline needs is here, so no
/// further handle access happens once extraction begins.
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    /// Playback position at snapshot time.
    pub position: Option<Duration>,
    /// Media duration, if known.
    pub duration: Option<Duration>,
    /// Natural video dimensions, if resolved.
    pub dimensions: Option<(u32, u32)>,
    /// Whether the player was ready to present frames.
    pub ready: bool,
    /// The media source, if a media item is loaded.
    pub source: Option<MediaSource>,
}

impl PlayerState {
    /// Read all state from `handle` in one pass.
    pub fn snapshot(handle: &dyn PlayerHandle) -> Self {
        Self {
            position: handle.position(),
            duration: handle.duration(),
            dimensions: handle.dimensions(),
            ready: handle.is_ready(),
            source: handle.media_source(),
        }
    }
}

/// The execution context on which player-state reads are safe.
///
/// Hosts whose player objects are confined to a particular thread (the
/// usual case for platform media frameworks) implement this by posting the
/// task to that thread's run loop / event queue. The engine only sends
/// short, non-blocking read closures through it.
pub trait AffinityContext: Send + Sync {
    /// Run `task` on the constrained context.
    ///
    /// The task must eventually run or be dropped; the engine handles both.
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>);
}

/// An [`AffinityContext`] that runs tasks on the calling thread.
///
/// Suitable for hosts whose player state is safe to read from any thread,
/// and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineAffinity;

impl AffinityContext for InlineAffinity {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

/// Snapshot `handle`'s state on the given affinity context.
///
/// Marshals the read through a oneshot channel. If the context drops the
/// task without running it (host shutting down), the state is read inline
/// instead — these reads are non-destructive, so a best-effort fallback
/// beats failing the whole request.
pub(crate) async fn read_state(
    affinity: &dyn AffinityContext,
    handle: Arc<dyn PlayerHandle>,
) -> PlayerState {
    let (sender, receiver) = oneshot::channel();
    let marshaled = Arc::clone(&handle);
    affinity.dispatch(Box::new(move || {
        let _ = sender.send(PlayerState::snapshot(marshaled.as_ref()));
    }));

    match receiver.await {
        Ok(state) => state,
        Err(_) => {
            log::warn!("affinity context dropped a state read; reading inline");
            PlayerState::snapshot(handle.as_ref())
        }
    }
}
