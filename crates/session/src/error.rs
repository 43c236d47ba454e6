//! Session errors.

use reefwarden_core::SubjectId;

/// Habitat mutations that were refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HabitatError {
    /// Feed attempted below the required health
    #[error("feed denied: health {health} below required {required}")]
    FeedDenied {
        /// Health at the time of the attempt
        health: u32,
        /// Threshold
        required: u32,
    },
}

/// Quiz start refusals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    /// Remote record says the quiz was already finished
    #[error("quiz '{0}' already completed")]
    AlreadyCompleted(SubjectId),
}
