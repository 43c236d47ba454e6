//! World events - inputs from the scene collaborators.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, MarkerId};
use crate::marker::TrackingState;

/// An input delivered to the interaction router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldEvent {
    /// Tap hit-test result
    Tap {
        /// Entity under the tap
        entity: EntityId,
    },

    /// Two entities started overlapping
    TriggerOverlap {
        /// First entity
        a: EntityId,
        /// Second entity
        b: EntityId,
    },

    /// Recognition state change for one marker
    Recognition {
        /// Marker id
        marker: MarkerId,
        /// New tracking state
        state: TrackingState,
    },

    /// Button press on one of the panels
    Ui {
        /// Which button
        action: UiAction,
    },
}

/// Panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "index", rename_all = "snake_case")]
pub enum UiAction {
    /// "Learn" on the options panel
    OpenInfo,
    /// Quiz-start affordance
    StartQuiz,
    /// Answer button
    Answer(usize),
    /// Any cancel button
    CloseAll,
}
