//! Liveness tokens for sessions with remote work in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ulid::Ulid;

/// Shared liveness flag.
///
/// The owner keeps one clone and hands others to in-flight remote work.
/// Revoking marks every clone dead; a completion that finds its token dead
/// is discarded instead of touching state that no longer exists.
#[derive(Debug, Clone)]
pub struct SessionToken {
    id: Ulid,
    live: Arc<AtomicBool>,
}

impl SessionToken {
    /// A fresh, live token.
    pub fn new() -> Self {
        Self {
            id: Ulid::new(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Token id, for logs.
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Whether the owning session still exists.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Mark the owning session gone.
    pub fn revoke(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Whether two tokens belong to the same session.
    pub fn same_session(&self, other: &SessionToken) -> bool {
        Arc::ptr_eq(&self.live, &other.live)
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}
