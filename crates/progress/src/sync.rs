//! Remote accumulation of quiz results.

use reefwarden_core::{
    habitats_path, CommitRequest, CommitStrategy, EngineConfig, HabitatName, ProgressKey,
    ProgressRecord, SubjectId, DELTAS_NODE, FIELD_IS_COMPLETED, FIELD_POINTS_EARNED,
    FIELD_TIME_TAKEN,
};
use reefwarden_storage::RemoteStore;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{ProgressError, Result};
use crate::handle::RemoteHandle;

/// Accumulates finished quiz runs into the player's remote records.
///
/// With [`CommitStrategy::ReadModifyWrite`] a commit is a read followed by a
/// separate write. Nothing orders two commits to the same record, so when
/// both read before either writes, the later write replaces the earlier
/// one's contribution. [`CommitStrategy::DeltaLog`] appends each run as its
/// own node instead and sums on read.
#[derive(Debug, Clone)]
pub struct ProgressSync {
    handle: RemoteHandle,
    strategy: CommitStrategy,
    mark_completed: bool,
}

impl ProgressSync {
    /// Read-modify-write, marking records completed.
    pub fn new(handle: RemoteHandle) -> Self {
        Self::with_config(handle, &EngineConfig::default())
    }

    /// Take strategy and completion marking from engine settings.
    pub fn with_config(handle: RemoteHandle, config: &EngineConfig) -> Self {
        Self {
            handle,
            strategy: config.commit_strategy,
            mark_completed: config.mark_completed_on_commit,
        }
    }

    /// Override the strategy.
    pub fn with_strategy(mut self, strategy: CommitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Active strategy.
    pub fn strategy(&self) -> CommitStrategy {
        self.strategy
    }

    /// Add a finished run to its record.
    ///
    /// Failures are logged and returned; the increment is not retried.
    pub async fn commit(&self, request: &CommitRequest) -> Result<()> {
        let binding = self.handle.binding().ok_or(ProgressError::Inert)?;
        let key = ProgressKey::new(
            binding.player.clone(),
            request.habitat.clone(),
            request.subject.clone(),
        );

        let outcome = match self.strategy {
            CommitStrategy::ReadModifyWrite => {
                self.read_modify_write(binding.store.as_ref(), &key, request).await
            }
            CommitStrategy::DeltaLog => self.append_delta(binding.store.as_ref(), &key, request).await,
        };

        match &outcome {
            Ok(()) => info!(
                "Committed {} points / {:.1}s to {}",
                request.points,
                request.duration_secs,
                key.path()
            ),
            Err(e) => warn!("Dropping progress increment for {}: {}", key.path(), e),
        }
        outcome
    }

    async fn read_modify_write(
        &self,
        store: &dyn RemoteStore,
        key: &ProgressKey,
        request: &CommitRequest,
    ) -> Result<()> {
        let path = key.path();
        let base = fetch_record(store, &path).await?.unwrap_or_default();
        let merged = base.accumulate(request.duration_secs, u64::from(request.points));
        debug!(
            "Accumulating {}: {:?} -> {:?}",
            path, base, merged
        );

        let mut fields = Map::new();
        fields.insert(FIELD_TIME_TAKEN.to_string(), Value::from(merged.time_taken));
        fields.insert(FIELD_POINTS_EARNED.to_string(), Value::from(merged.points_earned));
        if self.mark_completed {
            fields.insert(FIELD_IS_COMPLETED.to_string(), Value::Bool(true));
        }

        store
            .update(&path, fields)
            .await
            .map_err(|source| ProgressError::Write { path, source })
    }

    async fn append_delta(
        &self,
        store: &dyn RemoteStore,
        key: &ProgressKey,
        request: &CommitRequest,
    ) -> Result<()> {
        let delta_path = format!("{}/{}", key.deltas_path(), ulid::Ulid::new());
        let delta = serde_json::json!({
            FIELD_TIME_TAKEN: request.duration_secs,
            FIELD_POINTS_EARNED: request.points,
        });
        store
            .set(&delta_path, delta)
            .await
            .map_err(|source| ProgressError::Write { path: delta_path.clone(), source })?;

        if self.mark_completed {
            let path = key.path();
            let mut fields = Map::new();
            fields.insert(FIELD_IS_COMPLETED.to_string(), Value::Bool(true));
            store
                .update(&path, fields)
                .await
                .map_err(|source| ProgressError::Write { path, source })?;
        }
        Ok(())
    }

    /// Current totals for one record, merging any delta log.
    pub async fn load(&self, habitat: &HabitatName, subject: &SubjectId) -> Result<Option<ProgressRecord>> {
        let binding = self.handle.binding().ok_or(ProgressError::Inert)?;
        let key = ProgressKey::new(binding.player, habitat.clone(), subject.clone());
        fetch_record(binding.store.as_ref(), &key.path()).await
    }

    /// Every record of the signed-in player, sorted by habitat then subject.
    pub async fn load_all(&self) -> Result<Vec<(HabitatName, SubjectId, ProgressRecord)>> {
        let binding = self.handle.binding().ok_or(ProgressError::Inert)?;
        let path = habitats_path(&binding.player);
        let tree = binding
            .store
            .get(&path)
            .await
            .map_err(|source| ProgressError::Fetch { path: path.clone(), source })?;

        let mut records = Vec::new();
        let Some(Value::Object(habitats)) = tree else {
            return Ok(records);
        };
        for (habitat, subjects) in habitats {
            let Value::Object(subjects) = subjects else {
                continue;
            };
            for (subject, node) in subjects {
                let record_path = format!("{}/{}/{}", path, habitat, subject);
                let record = decode_record(&node, &record_path)?;
                records.push((HabitatName::new(habitat.clone()), SubjectId::new(subject), record));
            }
        }
        records.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        Ok(records)
    }
}

/// Read and decode one record; `None` when absent.
pub(crate) async fn fetch_record(store: &dyn RemoteStore, path: &str) -> Result<Option<ProgressRecord>> {
    let value = store
        .get(path)
        .await
        .map_err(|source| ProgressError::Fetch { path: path.to_string(), source })?;
    match value {
        Some(node) => decode_record(&node, path).map(Some),
        None => Ok(None),
    }
}

/// Decode a record node, folding in any appended deltas.
fn decode_record(node: &Value, path: &str) -> Result<ProgressRecord> {
    let malformed = |source| ProgressError::Malformed { path: path.to_string(), source };
    let mut record: ProgressRecord = serde_json::from_value(node.clone()).map_err(malformed)?;

    if let Some(deltas) = node.get(DELTAS_NODE).and_then(Value::as_object) {
        for delta in deltas.values() {
            let delta: ProgressRecord = serde_json::from_value(delta.clone()).map_err(malformed)?;
            record = record.accumulate(delta.time_taken, delta.points_earned);
        }
    }
    Ok(record)
}
