//! Output commands - what the engine asks the presentation layer to do.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, HabitatName, OverlayId, SubjectId};

/// The single active panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Panel {
    /// No panel
    #[default]
    None,
    /// Options for the selected animal
    Options,
    /// Animal info
    Info,
    /// Quiz in progress
    Quiz,
}

/// Audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Habitat fed
    Feed,
    /// Trash cleaned
    Clean,
}

/// Commands emitted by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Show exactly this panel, hiding the others
    ShowPanel {
        /// Panel to show
        panel: Panel,
    },

    /// Enable or disable the quiz-start affordance
    SetQuizStartEnabled {
        /// New state
        enabled: bool,
    },

    /// Fill the info panel
    ShowAnimalInfo {
        /// Display name
        name: String,
        /// Description
        description: String,
        /// Image reference
        image: Option<String>,
    },

    /// Display a question
    ShowQuestion {
        /// Subject
        subject: SubjectId,
        /// Zero-based question index
        index: usize,
        /// Question count
        total: usize,
        /// Prompt
        prompt: String,
        /// Three options
        options: [String; 3],
    },

    /// Feedback for the answer just given
    AnswerMarked {
        /// Whether it was correct
        correct: bool,
        /// Points accumulated so far
        points: u32,
    },

    /// Quiz run finished locally
    QuizFinished {
        /// Subject
        subject: SubjectId,
        /// Points earned in the run
        points: u32,
        /// Seconds taken
        duration_secs: f64,
    },

    /// Health meter value
    HealthMeter {
        /// Habitat
        habitat: HabitatName,
        /// Current value
        value: u32,
        /// Maximum
        max: u32,
    },

    /// Make entities visible/active
    Activate {
        /// Entities
        entities: Vec<EntityId>,
    },

    /// Hide/deactivate entities
    Deactivate {
        /// Entities
        entities: Vec<EntityId>,
    },

    /// Remove an entity from the scene after a delay
    Despawn {
        /// Entity
        entity: EntityId,
        /// Delay in milliseconds
        delay_ms: u64,
    },

    /// Show this overlay and hide every other
    ShowOverlay {
        /// Overlay
        overlay: OverlayId,
    },

    /// Hide every overlay
    HideAllOverlays,

    /// Play an audio cue
    PlayCue {
        /// Cue
        cue: Cue,
    },
}
