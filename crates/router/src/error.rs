//! Router errors.
//!
//! Every variant is a refused interaction: the router logs it and carries
//! on. None of them leave partial state behind.

use reefwarden_core::{EntityId, HabitatName, SubjectId};
use reefwarden_session::{HabitatError, QuizError};

/// Why an event was not acted on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The action needs a selection or session that does not exist
    #[error("missing session context: {0}")]
    MissingSessionContext(&'static str),

    /// Nothing selectable at or above the tapped entity
    #[error("nothing selectable at {0}")]
    NothingSelectable(EntityId),

    /// The completion check for the selection has not resolved
    #[error("completion check for {0} has not resolved")]
    GateUnresolved(SubjectId),

    /// A quiz is already running
    #[error("quiz already in progress for {0}")]
    QuizInProgress(SubjectId),

    /// No quiz is configured for the subject
    #[error("no quiz configured for {0}")]
    NoQuiz(SubjectId),

    /// Entity has no owning habitat
    #[error("entity {0} belongs to no habitat")]
    Unowned(EntityId),

    /// Habitat missing from the runtime state
    #[error("unknown habitat: {0}")]
    UnknownHabitat(HabitatName),

    /// Feeding refused
    #[error(transparent)]
    Habitat(#[from] HabitatError),

    /// Quiz refused to start
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Result type for router operations
pub type Result<T> = std::result::Result<T, RouterError>;
