//! World entities and their categories.
//!
//! Entities arrive from configuration with free-form string tags. The tag is
//! resolved to an [`EntityCategory`] once, when the [`EntityGraph`] is built,
//! so event routing never compares strings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::id::{EntityId, HabitatName, SubjectId};

/// Routing category of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// A habitat body that accepts feed
    Habitat,
    /// Trash or algae floating in a habitat
    Trash,
    /// Cleaning tool
    Sponge,
    /// Feed item
    Feedbag,
    /// Animal carrying quiz/info data
    Animal,
    /// Unlockable or marker-anchored content
    Content,
    /// Anything else
    Other,
}

impl EntityCategory {
    /// Resolve a configuration tag. Unknown tags map to [`EntityCategory::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "habitat" => Self::Habitat,
            "trash" | "algae" => Self::Trash,
            "sponge" => Self::Sponge,
            "feedbag" => Self::Feedbag,
            "animal" => Self::Animal,
            "content" | "fish" => Self::Content,
            _ => Self::Other,
        }
    }
}

/// Display and quiz data carried by an animal entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalProfile {
    /// Display name
    pub name: String,

    /// Info panel text
    #[serde(default)]
    pub description: String,

    /// Image reference for the info panel
    #[serde(default)]
    pub image: Option<String>,

    /// Habitat the animal belongs to
    pub habitat: HabitatName,

    /// Quiz subject
    pub subject: SubjectId,
}

/// Entity as it appears in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity id
    pub id: EntityId,

    /// Parent in the scene hierarchy
    #[serde(default)]
    pub parent: Option<EntityId>,

    /// Free-form tag
    #[serde(default)]
    pub tag: String,

    /// Habitat this entity belongs to (habitat bodies and trash)
    #[serde(default)]
    pub habitat: Option<HabitatName>,

    /// Animal data, if any
    #[serde(default)]
    pub animal: Option<AnimalProfile>,
}

/// Resolved entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Entity id
    pub id: EntityId,
    /// Parent entity
    pub parent: Option<EntityId>,
    /// Resolved category
    pub category: EntityCategory,
    /// Owning habitat, if declared
    pub habitat: Option<HabitatName>,
    /// Animal data, if any
    pub animal: Option<AnimalProfile>,
}

/// Entity lookup with parent traversal.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    entities: HashMap<EntityId, Entity>,
}

impl EntityGraph {
    /// Build the graph, resolving tags and checking parent references.
    pub fn build(configs: impl IntoIterator<Item = EntityConfig>) -> Result<Self> {
        let mut entities = HashMap::new();
        for cfg in configs {
            let category = if cfg.animal.is_some() && cfg.tag.is_empty() {
                EntityCategory::Animal
            } else {
                EntityCategory::from_tag(&cfg.tag)
            };
            let entity = Entity {
                id: cfg.id.clone(),
                parent: cfg.parent,
                category,
                habitat: cfg.habitat,
                animal: cfg.animal,
            };
            if entities.insert(cfg.id.clone(), entity).is_some() {
                return Err(ConfigError::Duplicate {
                    kind: "entity",
                    id: cfg.id.to_string(),
                });
            }
        }

        for entity in entities.values() {
            if let Some(parent) = &entity.parent {
                if !entities.contains_key(parent) {
                    return Err(ConfigError::UnknownReference {
                        from: format!("entity '{}'", entity.id),
                        kind: "parent entity",
                        id: parent.to_string(),
                    });
                }
            }
        }

        Ok(Self { entities })
    }

    /// Look up an entity.
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Category of an entity; unknown ids are [`EntityCategory::Other`].
    pub fn category(&self, id: &EntityId) -> EntityCategory {
        self.get(id).map(|e| e.category).unwrap_or(EntityCategory::Other)
    }

    /// Iterate over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Walk from `id` up through its parents, starting with `id` itself.
    ///
    /// Stops after visiting every entity once so a cyclic hierarchy cannot
    /// loop forever.
    pub fn ancestors<'a>(&'a self, id: &EntityId) -> impl Iterator<Item = &'a Entity> + 'a {
        let mut next = self.get(id);
        let mut budget = self.entities.len();
        std::iter::from_fn(move || {
            if budget == 0 {
                return None;
            }
            budget -= 1;
            let current = next?;
            next = current.parent.as_ref().and_then(|p| self.get(p));
            Some(current)
        })
    }

    /// Nearest entity at or above `id` that carries animal data.
    pub fn nearest_animal(&self, id: &EntityId) -> Option<(&Entity, &AnimalProfile)> {
        self.ancestors(id)
            .find_map(|e| e.animal.as_ref().map(|profile| (e, profile)))
    }

    /// Habitat owning `id`: the first declared habitat on the way up.
    pub fn owning_habitat(&self, id: &EntityId) -> Option<&HabitatName> {
        self.ancestors(id).find_map(|e| e.habitat.as_ref())
    }
}
