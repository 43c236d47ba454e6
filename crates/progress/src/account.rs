//! Account setup - seeds a new player's progress tree.

use reefwarden_core::{
    player_path, ProgressRecord, Roster, FIELD_IS_COMPLETED, FIELD_POINTS_EARNED,
    FIELD_TIME_TAKEN,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ProgressError, Result};
use crate::handle::RemoteHandle;

/// Public profile fields stored next to the progress tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Display name
    pub username: String,
    /// Contact address
    pub email: String,
}

/// Write the signed-in player's profile and a zeroed record for every
/// roster subject. Replaces whatever was stored for that player.
pub async fn provision_player(handle: &RemoteHandle, profile: &PlayerProfile, roster: &Roster) -> Result<()> {
    let binding = handle.binding().ok_or(ProgressError::Inert)?;

    let mut habitats = Map::new();
    for (habitat, subjects) in &roster.habitats {
        let mut entries = Map::new();
        for subject in subjects {
            entries.insert(subject.to_string(), zeroed_record());
        }
        habitats.insert(habitat.to_string(), Value::Object(entries));
    }

    let mut player = Map::new();
    player.insert("username".to_string(), Value::from(profile.username.clone()));
    player.insert("email".to_string(), Value::from(profile.email.clone()));
    player.insert("habitats".to_string(), Value::Object(habitats));

    let path = player_path(&binding.player);
    binding
        .store
        .set(&path, Value::Object(player))
        .await
        .map_err(|source| ProgressError::Write { path: path.clone(), source })?;

    info!(
        "Provisioned {} with {} subjects",
        binding.player,
        roster.pairs().count()
    );
    Ok(())
}

fn zeroed_record() -> Value {
    let zero = ProgressRecord::default();
    let mut fields = Map::new();
    fields.insert(FIELD_TIME_TAKEN.to_string(), Value::from(zero.time_taken));
    fields.insert(FIELD_POINTS_EARNED.to_string(), Value::from(zero.points_earned));
    fields.insert(FIELD_IS_COMPLETED.to_string(), Value::Bool(zero.is_completed));
    Value::Object(fields)
}
