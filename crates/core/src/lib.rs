//! Reefwarden core data models.
//!
//! This crate defines the static configuration, remote record shapes, world
//! events and output commands shared by the engine crates.

#![warn(missing_docs)]

// Core identities
mod id;

// Static configuration
mod config;
mod entity;
mod habitat;
mod marker;
mod quiz;
mod roster;

// Remote records
mod record;

// Engine inputs and outputs
mod command;
mod event;

mod error;

// Re-exports
pub use id::*;

pub use config::{CommitStrategy, EngineConfig, GameConfig};
pub use entity::{AnimalProfile, Entity, EntityCategory, EntityConfig, EntityGraph};
pub use habitat::HabitatConfig;
pub use marker::{MarkerConfig, TrackingState};
pub use quiz::{Question, QuizConfig, QuizDefinition, OPTIONS_PER_QUESTION, POINTS_PER_CORRECT};
pub use roster::Roster;

pub use record::{
    habitats_path, player_path, CommitRequest, GateVerdict, ProgressKey, ProgressRecord,
    DELTAS_NODE, FIELD_IS_COMPLETED, FIELD_POINTS_EARNED, FIELD_TIME_TAKEN, PLAYERS_ROOT,
};

pub use command::{Command, Cue, Panel};
pub use event::{UiAction, WorldEvent};

pub use error::{ConfigError, Result};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
