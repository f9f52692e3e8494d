//! Tracking of live player instances.
//!
//! [`PlayerRegistry`] maps host-assigned ids to [`PlayerHandle`]s. The host
//! populates it through the engine's lifecycle callbacks; every capture
//! operation starts with a lookup here.
//!
//! Lifecycle calls and lookups arrive from different execution contexts, so
//! the map sits behind an [`RwLock`] with strictly bounded critical
//! sections: insert, remove, clone-out, or snapshot — nothing else runs
//! under the lock. Readers never observe a half-inserted entry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::player::{PlayerHandle, PlayerId};

/// Thread-safe map of live players, keyed by host-assigned id.
#[derive(Default)]
pub struct PlayerRegistry {
    players: RwLock<HashMap<PlayerId, Arc<dyn PlayerHandle>>>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a player, overwriting any existing entry under the same id.
    ///
    /// Called once per live player when the host reports creation. The
    /// handle is not validated for readiness — a player registered while
    /// still buffering is a normal state.
    pub fn register(&self, id: impl Into<PlayerId>, handle: Arc<dyn PlayerHandle>) {
        let id = id.into();
        log::debug!("registering player {id:?}");
        self.write_lock().insert(id, handle);
    }

    /// Remove a player if present.
    ///
    /// Idempotent — removing an unknown id is not an error. Returns whether
    /// an entry was actually removed.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.write_lock().remove(id).is_some();
        if removed {
            log::debug!("unregistered player {id:?}");
        }
        removed
    }

    /// Look up a player by id.
    ///
    /// Non-blocking beyond the map access itself. Returns `None` for
    /// unknown or already-removed ids.
    pub fn lookup(&self, id: &str) -> Option<Arc<dyn PlayerHandle>> {
        self.read_lock().get(id).cloned()
    }

    /// Snapshot the currently registered ids.
    ///
    /// The returned vector is detached — later mutation of the registry
    /// does not affect it.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.read_lock().keys().cloned().collect()
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    /// Whether no players are registered.
    pub fn is_empty(&self) -> bool {
        self.read_lock().is_empty()
    }

    // A panic while holding the lock must not wedge lifecycle callbacks,
    // so poisoning is stripped. The map itself is always structurally
    // consistent: every mutation is a single insert or remove.
    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<PlayerId, Arc<dyn PlayerHandle>>> {
        self.players.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<PlayerId, Arc<dyn PlayerHandle>>> {
        self.players.write().unwrap_or_else(PoisonError::into_inner)
    }
}
