//! Remote progress records and their addressing.

use serde::{Deserialize, Serialize};

use crate::id::{HabitatName, PlayerId, SubjectId};

/// Root collection holding every player's tree.
pub const PLAYERS_ROOT: &str = "players";

/// Field name for accumulated seconds.
pub const FIELD_TIME_TAKEN: &str = "timeTaken";

/// Field name for accumulated points.
pub const FIELD_POINTS_EARNED: &str = "pointsEarned";

/// Field name for the completion flag.
pub const FIELD_IS_COMPLETED: &str = "isCompleted";

/// Child node holding appended deltas when the delta-log strategy is used.
pub const DELTAS_NODE: &str = "deltas";

/// Per player × habitat × subject accumulator, as stored remotely.
///
/// Missing fields decode to zero / `false`, so an account provisioned before
/// the completion flag existed still reads as not completed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Accumulated seconds spent in quizzes
    #[serde(default)]
    pub time_taken: f64,

    /// Accumulated points
    #[serde(default)]
    pub points_earned: u64,

    /// Whether the quiz has been finished at least once
    #[serde(default)]
    pub is_completed: bool,
}

impl ProgressRecord {
    /// Add a delta to the accumulated totals.
    pub fn accumulate(&self, duration_secs: f64, points: u64) -> Self {
        Self {
            time_taken: self.time_taken + duration_secs,
            points_earned: self.points_earned.saturating_add(points),
            is_completed: self.is_completed,
        }
    }
}

/// Addresses one progress record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    /// Player
    pub player: PlayerId,
    /// Habitat
    pub habitat: HabitatName,
    /// Subject
    pub subject: SubjectId,
}

impl ProgressKey {
    /// Create a key.
    pub fn new(player: PlayerId, habitat: HabitatName, subject: SubjectId) -> Self {
        Self { player, habitat, subject }
    }

    /// `players/{uid}/habitats/{habitat}/{subject}`
    pub fn path(&self) -> String {
        format!(
            "{}/{}/habitats/{}/{}",
            PLAYERS_ROOT, self.player, self.habitat, self.subject
        )
    }

    /// Path of the delta log under this record.
    pub fn deltas_path(&self) -> String {
        format!("{}/{}", self.path(), DELTAS_NODE)
    }
}

/// Path of a player's root node.
pub fn player_path(player: &PlayerId) -> String {
    format!("{}/{}", PLAYERS_ROOT, player)
}

/// Path of a player's habitat collection.
pub fn habitats_path(player: &PlayerId) -> String {
    format!("{}/habitats", player_path(player))
}

/// Result of a completion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Not completed yet; the quiz may start
    Open,
    /// Already completed; retakes are refused
    Completed,
}

impl GateVerdict {
    /// Derive a verdict from an optional record; missing means open.
    pub fn from_record(record: Option<&ProgressRecord>) -> Self {
        match record {
            Some(r) if r.is_completed => GateVerdict::Completed,
            _ => GateVerdict::Open,
        }
    }

    /// Whether the quiz may start.
    pub fn is_open(self) -> bool {
        matches!(self, GateVerdict::Open)
    }
}

/// A finished quiz run waiting to be accumulated remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    /// Habitat of the quiz
    pub habitat: HabitatName,
    /// Subject of the quiz
    pub subject: SubjectId,
    /// Seconds between start and the final answer
    pub duration_secs: f64,
    /// Points accumulated during the run
    pub points: u32,
}
