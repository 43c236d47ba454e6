//! Identity-bound store handle.
//!
//! The engine only talks to the remote store on behalf of a signed-in player.
//! [`RemoteHandle`] is that binding: initialized on sign-in, cleared on
//! sign-out, and cloned into every component that needs the store. While it
//! is unbound the engine is inert.

use std::sync::{Arc, RwLock};

use reefwarden_core::PlayerId;
use reefwarden_storage::RemoteStore;
use tracing::info;

/// The signed-in player and their store.
#[derive(Clone)]
pub struct Binding {
    /// Player uid
    pub player: PlayerId,
    /// Store holding the player's records
    pub store: Arc<dyn RemoteStore>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding").field("player", &self.player).finish_non_exhaustive()
    }
}

/// Shared, explicitly passed store binding.
#[derive(Clone, Default, Debug)]
pub struct RemoteHandle {
    inner: Arc<RwLock<Option<Binding>>>,
}

impl RemoteHandle {
    /// An unbound handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle already bound to `player`.
    pub fn bound(player: PlayerId, store: Arc<dyn RemoteStore>) -> Self {
        let handle = Self::new();
        handle.sign_in(player, store);
        handle
    }

    /// Bind a player. Replaces any previous binding.
    pub fn sign_in(&self, player: PlayerId, store: Arc<dyn RemoteStore>) {
        info!("Signed in as {}", player);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(Binding { player, store });
    }

    /// Drop the binding; the engine becomes inert.
    pub fn sign_out(&self) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = guard.take() {
            info!("Signed out {}", previous.player);
        }
    }

    /// Current binding, if any.
    pub fn binding(&self) -> Option<Binding> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether a player is bound.
    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }
}
