//! Local session state (Layer 2)
//!
//! Habitat health meters, quiz session state machines and the liveness
//! tokens that let late remote completions detect a dead session.

#![warn(missing_docs)]

pub mod error;
pub mod habitat;
pub mod quiz;
pub mod token;

pub use error::{HabitatError, QuizError};
pub use habitat::{HabitatState, HealthChange, CLEAN_AMOUNT, FEED_AMOUNT};
pub use quiz::{AnswerOutcome, QuizSession, QuizState};
pub use token::SessionToken;
