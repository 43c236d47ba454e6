//! Configuration errors.

/// Errors raised while loading or validating static game configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Quiz arrays disagree in length
    #[error("quiz '{subject}': {questions} questions, {answer_sets} answer sets, {correct_indexes} correct indexes")]
    QuizShape {
        /// Subject of the offending quiz
        subject: String,
        /// Number of question prompts
        questions: usize,
        /// Number of answer sets
        answer_sets: usize,
        /// Number of correct indexes
        correct_indexes: usize,
    },

    /// An answer set does not have exactly three options
    #[error("quiz '{subject}' question {question}: expected 3 options, found {found}")]
    AnswerSetSize {
        /// Subject of the offending quiz
        subject: String,
        /// Question index
        question: usize,
        /// Options found
        found: usize,
    },

    /// Correct index outside 0..=2
    #[error("quiz '{subject}' question {question}: correct index {index} out of range")]
    CorrectIndex {
        /// Subject of the offending quiz
        subject: String,
        /// Question index
        question: usize,
        /// Configured index
        index: usize,
    },

    /// Quiz with no questions
    #[error("quiz '{0}' has no questions")]
    EmptyQuiz(String),

    /// Habitat health values are inconsistent
    #[error("habitat '{name}': {reason}")]
    Habitat {
        /// Habitat name
        name: String,
        /// What is wrong
        reason: String,
    },

    /// Two definitions share an identifier
    #[error("duplicate {kind} '{id}'")]
    Duplicate {
        /// Kind of definition
        kind: &'static str,
        /// Repeated identifier
        id: String,
    },

    /// A reference points at something that does not exist
    #[error("{from} references unknown {kind} '{id}'")]
    UnknownReference {
        /// Referencing definition
        from: String,
        /// Kind of the missing target
        kind: &'static str,
        /// Missing identifier
        id: String,
    },
}

/// Result alias for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
