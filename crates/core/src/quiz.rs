//! Quiz definitions.
//!
//! Quizzes are authored as three parallel arrays (prompts, answer sets and
//! correct indexes). [`QuizDefinition::try_from`] checks that the arrays line
//! up and folds them into [`Question`]s so nothing downstream indexes the
//! arrays separately.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::id::{HabitatName, SubjectId};

/// Number of answer options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 3;

/// Points awarded for a correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;

/// Quiz as it appears in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Subject (animal) this quiz is about
    pub subject: SubjectId,

    /// Habitat the subject lives in
    pub habitat: HabitatName,

    /// Question prompts, in order
    pub questions: Vec<String>,

    /// Answer options per question
    pub answer_sets: Vec<Vec<String>>,

    /// Correct option per question
    pub correct_indexes: Vec<usize>,
}

/// A single validated question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text
    pub prompt: String,

    /// The three options
    pub options: [String; OPTIONS_PER_QUESTION],

    /// Index of the correct option
    pub correct: usize,
}

impl Question {
    /// Whether `selected` is the correct option.
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct
    }
}

/// Validated, ordered quiz for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizDefinition {
    /// Subject
    pub subject: SubjectId,

    /// Habitat
    pub habitat: HabitatName,

    /// Questions in presentation order; never empty
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a validated definition.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`.
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

impl TryFrom<QuizConfig> for QuizDefinition {
    type Error = ConfigError;

    fn try_from(cfg: QuizConfig) -> Result<Self, Self::Error> {
        let subject = cfg.subject.to_string();

        if cfg.questions.len() != cfg.answer_sets.len()
            || cfg.questions.len() != cfg.correct_indexes.len()
        {
            return Err(ConfigError::QuizShape {
                subject,
                questions: cfg.questions.len(),
                answer_sets: cfg.answer_sets.len(),
                correct_indexes: cfg.correct_indexes.len(),
            });
        }
        if cfg.questions.is_empty() {
            return Err(ConfigError::EmptyQuiz(subject));
        }

        let mut questions = Vec::with_capacity(cfg.questions.len());
        let rows = cfg
            .questions
            .into_iter()
            .zip(cfg.answer_sets)
            .zip(cfg.correct_indexes);

        for (i, ((prompt, answers), correct)) in rows.enumerate() {
            let found = answers.len();
            let options: [String; OPTIONS_PER_QUESTION] =
                answers.try_into().map_err(|_| ConfigError::AnswerSetSize {
                    subject: subject.clone(),
                    question: i,
                    found,
                })?;
            if correct >= OPTIONS_PER_QUESTION {
                return Err(ConfigError::CorrectIndex {
                    subject: subject.clone(),
                    question: i,
                    index: correct,
                });
            }
            questions.push(Question { prompt, options, correct });
        }

        Ok(Self {
            subject: cfg.subject,
            habitat: cfg.habitat,
            questions,
        })
    }
}
