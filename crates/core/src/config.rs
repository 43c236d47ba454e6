//! Static game configuration and engine settings.
//!
//! The configuration file is a single JSON document:
//!
//! ```json
//! {
//!   "habitats": [{ "name": "Ocean", "unlocks": ["fish-1"] }],
//!   "quizzes":  [{ "subject": "Jellyfish", "habitat": "Ocean",
//!                  "questions": ["..."], "answer_sets": [["a","b","c"]],
//!                  "correct_indexes": [1] }],
//!   "entities": [{ "id": "fish-1", "tag": "Content" }],
//!   "markers":  [{ "id": "ocean-card", "overlay": "ocean-canvas" }],
//!   "engine":   { "commit_strategy": "read_modify_write" }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityConfig, EntityGraph};
use crate::error::{ConfigError, Result};
use crate::habitat::HabitatConfig;
use crate::id::{HabitatName, SubjectId};
use crate::marker::MarkerConfig;
use crate::quiz::{QuizConfig, QuizDefinition};
use crate::roster::Roster;

/// How quiz results are accumulated into the remote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitStrategy {
    /// Read the record, add the delta, write it back. Concurrent commits to
    /// one key can lose updates.
    #[default]
    ReadModifyWrite,
    /// Append each delta as its own child node and sum them on read.
    DeltaLog,
}

/// Engine behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accumulation strategy
    pub commit_strategy: CommitStrategy,

    /// Set `isCompleted` when a finished run is committed
    pub mark_completed_on_commit: bool,

    /// Initial state of the quiz-start affordance before any gate resolves
    pub start_enabled_initially: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commit_strategy: CommitStrategy::default(),
            mark_completed_on_commit: true,
            start_enabled_initially: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GameConfigFile {
    #[serde(default)]
    habitats: Vec<HabitatConfig>,
    #[serde(default)]
    quizzes: Vec<QuizConfig>,
    #[serde(default)]
    entities: Vec<EntityConfig>,
    #[serde(default)]
    markers: Vec<MarkerConfig>,
    #[serde(default)]
    engine: EngineConfig,
}

/// Validated game configuration.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Habitats in declaration order
    pub habitats: Vec<HabitatConfig>,

    /// Quizzes by subject
    pub quizzes: HashMap<SubjectId, Arc<QuizDefinition>>,

    /// Resolved entity graph
    pub entities: EntityGraph,

    /// Known markers in declaration order; order is the overlay tie-break
    pub markers: Vec<MarkerConfig>,

    /// Engine settings
    pub engine: EngineConfig,
}

impl GameConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: GameConfigFile = serde_json::from_str(json)?;
        Self::build(file)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn build(file: GameConfigFile) -> Result<Self> {
        let mut habitat_names = HashSet::new();
        for habitat in &file.habitats {
            habitat.validate()?;
            if !habitat_names.insert(habitat.name.clone()) {
                return Err(ConfigError::Duplicate {
                    kind: "habitat",
                    id: habitat.name.to_string(),
                });
            }
        }

        let mut quizzes = HashMap::new();
        for cfg in file.quizzes {
            let quiz = QuizDefinition::try_from(cfg)?;
            require_habitat(&habitat_names, &quiz.habitat, || {
                format!("quiz '{}'", quiz.subject)
            })?;
            let subject = quiz.subject.clone();
            if quizzes.insert(subject.clone(), Arc::new(quiz)).is_some() {
                return Err(ConfigError::Duplicate {
                    kind: "quiz",
                    id: subject.to_string(),
                });
            }
        }

        let entities = EntityGraph::build(file.entities)?;
        for entity in entities.iter() {
            if let Some(habitat) = &entity.habitat {
                require_habitat(&habitat_names, habitat, || format!("entity '{}'", entity.id))?;
            }
            if let Some(animal) = &entity.animal {
                require_habitat(&habitat_names, &animal.habitat, || {
                    format!("animal on entity '{}'", entity.id)
                })?;
                if !quizzes.contains_key(&animal.subject) {
                    return Err(ConfigError::UnknownReference {
                        from: format!("animal on entity '{}'", entity.id),
                        kind: "quiz",
                        id: animal.subject.to_string(),
                    });
                }
            }
        }
        for habitat in &file.habitats {
            for content in &habitat.unlocks {
                if entities.get(content).is_none() {
                    return Err(ConfigError::UnknownReference {
                        from: format!("habitat '{}'", habitat.name),
                        kind: "entity",
                        id: content.to_string(),
                    });
                }
            }
        }

        let mut marker_ids = HashSet::new();
        for marker in &file.markers {
            if !marker_ids.insert(marker.id.clone()) {
                return Err(ConfigError::Duplicate {
                    kind: "marker",
                    id: marker.id.to_string(),
                });
            }
            if let Some(content) = &marker.content {
                if entities.get(content).is_none() {
                    return Err(ConfigError::UnknownReference {
                        from: format!("marker '{}'", marker.id),
                        kind: "entity",
                        id: content.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            habitats: file.habitats,
            quizzes,
            entities,
            markers: file.markers,
            engine: file.engine,
        })
    }

    /// Quiz for a subject.
    pub fn quiz(&self, subject: &SubjectId) -> Option<&Arc<QuizDefinition>> {
        self.quizzes.get(subject)
    }

    /// Roster of quiz subjects grouped by habitat, in habitat declaration order.
    pub fn roster(&self) -> Roster {
        let mut habitats = Vec::new();
        for habitat in &self.habitats {
            let mut subjects: Vec<SubjectId> = self
                .quizzes
                .values()
                .filter(|q| q.habitat == habitat.name)
                .map(|q| q.subject.clone())
                .collect();
            subjects.sort();
            if !subjects.is_empty() {
                habitats.push((habitat.name.clone(), subjects));
            }
        }
        Roster { habitats }
    }
}

fn require_habitat(
    known: &HashSet<HabitatName>,
    habitat: &HabitatName,
    from: impl FnOnce() -> String,
) -> Result<()> {
    if known.contains(habitat) {
        Ok(())
    } else {
        Err(ConfigError::UnknownReference {
            from: from(),
            kind: "habitat",
            id: habitat.to_string(),
        })
    }
}
