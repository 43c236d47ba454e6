//! Quiz session state machine.
//!
//! ```text
//! start ──▶ Active(0) ──answer──▶ Active(1) ── … ──answer──▶ Complete
//!              │                      │
//!              └──────── cancel ──────┴──▶ Idle
//! ```
//!
//! The session never touches the store. The answer that completes it
//! returns a [`CommitRequest`]; since the state is then `Complete` and
//! further answers are ignored, that request is produced exactly once.

use std::sync::Arc;

use reefwarden_core::{
    CommitRequest, GateVerdict, HabitatName, Question, QuizDefinition, SubjectId, Time,
    POINTS_PER_CORRECT,
};
use tracing::debug;

use crate::error::QuizError;

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    /// Cancelled; nothing will be committed
    Idle,
    /// Waiting for an answer to `question`
    Active {
        /// Zero-based index of the displayed question
        question: usize,
    },
    /// All questions answered; the commit has been handed out
    Complete,
}

/// Result of one [`QuizSession::answer`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// Session was not active; nothing changed
    Ignored,
    /// Answer recorded, next question loaded
    Next {
        /// Whether the answer was correct
        correct: bool,
        /// Index of the question now displayed
        question: usize,
    },
    /// Last answer recorded; the run must be committed
    Finished {
        /// Whether the last answer was correct
        correct: bool,
        /// The one commit for this session
        commit: CommitRequest,
    },
}

/// One run through a subject's quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    definition: Arc<QuizDefinition>,
    state: QuizState,
    points: u32,
    started_at: Time,
}

impl QuizSession {
    /// Start a run. Only an [`GateVerdict::Open`] verdict admits a start.
    pub fn start(definition: Arc<QuizDefinition>, verdict: GateVerdict, now: Time) -> Result<Self, QuizError> {
        if !verdict.is_open() {
            return Err(QuizError::AlreadyCompleted(definition.subject.clone()));
        }
        debug!("Quiz started: {} ({} questions)", definition.subject, definition.len());
        Ok(Self {
            definition,
            state: QuizState::Active { question: 0 },
            points: 0,
            started_at: now,
        })
    }

    /// Subject.
    pub fn subject(&self) -> &SubjectId {
        &self.definition.subject
    }

    /// Habitat.
    pub fn habitat(&self) -> &HabitatName {
        &self.definition.habitat
    }

    /// Number of questions.
    pub fn total(&self) -> usize {
        self.definition.len()
    }

    /// Lifecycle state.
    pub fn state(&self) -> QuizState {
        self.state
    }

    /// Points so far.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// When the run started.
    pub fn started_at(&self) -> Time {
        self.started_at
    }

    /// Whether answers are being accepted.
    pub fn is_active(&self) -> bool {
        matches!(self.state, QuizState::Active { .. })
    }

    /// Question currently displayed.
    pub fn current_question(&self) -> Option<(usize, &Question)> {
        match self.state {
            QuizState::Active { question } => {
                self.definition.question(question).map(|q| (question, q))
            }
            _ => None,
        }
    }

    /// Submit an answer for the current question.
    ///
    /// An index outside the three options counts as wrong. Exactly one
    /// question is consumed per call while active.
    pub fn answer(&mut self, selected: usize, now: Time) -> AnswerOutcome {
        let QuizState::Active { question } = self.state else {
            return AnswerOutcome::Ignored;
        };
        let Some(current) = self.definition.question(question) else {
            return AnswerOutcome::Ignored;
        };

        let correct = current.is_correct(selected);
        if correct {
            self.points += POINTS_PER_CORRECT;
        }

        let next = question + 1;
        if next < self.definition.len() {
            self.state = QuizState::Active { question: next };
            return AnswerOutcome::Next { correct, question: next };
        }

        self.state = QuizState::Complete;
        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0);
        let commit = CommitRequest {
            habitat: self.definition.habitat.clone(),
            subject: self.definition.subject.clone(),
            duration_secs: elapsed_ms as f64 / 1000.0,
            points: self.points,
        };
        debug!(
            "Quiz complete: {} scored {} in {:.1}s",
            commit.subject, commit.points, commit.duration_secs
        );
        AnswerOutcome::Finished { correct, commit }
    }

    /// Abandon the run. Nothing is committed.
    pub fn cancel(&mut self) {
        if self.state != QuizState::Idle {
            debug!("Quiz cancelled: {}", self.definition.subject);
        }
        self.state = QuizState::Idle;
    }
}
