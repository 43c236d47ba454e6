//! Completion gate - refuses quiz retakes once a record is marked complete.

use reefwarden_core::{GateVerdict, HabitatName, ProgressKey, SubjectId};
use tracing::debug;

use crate::error::{ProgressError, Result};
use crate::handle::RemoteHandle;
use crate::sync::fetch_record;

/// Asks the remote store whether a quiz has already been completed.
///
/// Holds no cache: every call is a fresh read, and concurrent checks for the
/// same record are independent.
#[derive(Debug, Clone)]
pub struct CompletionGate {
    handle: RemoteHandle,
}

impl CompletionGate {
    /// Create a gate over a store binding.
    pub fn new(handle: RemoteHandle) -> Self {
        Self { handle }
    }

    /// Read the record for `habitat`/`subject`. A missing record is open.
    pub async fn is_completed(&self, habitat: &HabitatName, subject: &SubjectId) -> Result<GateVerdict> {
        let binding = self.handle.binding().ok_or(ProgressError::Inert)?;
        let key = ProgressKey::new(binding.player, habitat.clone(), subject.clone());
        let path = key.path();

        let record = fetch_record(binding.store.as_ref(), &path).await?;
        let verdict = GateVerdict::from_record(record.as_ref());
        debug!("Gate {} -> {:?}", path, verdict);
        Ok(verdict)
    }
}
