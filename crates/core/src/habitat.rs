//! Habitat configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::id::{EntityId, HabitatName};

/// Static description of one habitat's health meter and unlockable content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitatConfig {
    /// Habitat name, also used as a remote path segment
    pub name: HabitatName,

    /// Upper bound of the health meter
    #[serde(default = "default_max_health")]
    pub max_health: u32,

    /// Health at load time
    #[serde(default)]
    pub current_health: u32,

    /// Minimum health before feeding is accepted
    #[serde(default = "default_required_health")]
    pub required_health_for_feed: u32,

    /// Content made visible once the habitat reaches full health
    #[serde(default)]
    pub unlocks: Vec<EntityId>,
}

fn default_max_health() -> u32 {
    100
}

fn default_required_health() -> u32 {
    50
}

impl HabitatConfig {
    /// A habitat with the default meter (0 of 100, feed threshold 50).
    pub fn new(name: impl Into<HabitatName>) -> Self {
        Self {
            name: name.into(),
            max_health: default_max_health(),
            current_health: 0,
            required_health_for_feed: default_required_health(),
            unlocks: Vec::new(),
        }
    }

    /// Set unlockable content.
    pub fn with_unlocks(mut self, unlocks: impl IntoIterator<Item = EntityId>) -> Self {
        self.unlocks = unlocks.into_iter().collect();
        self
    }

    /// Check the meter bounds.
    pub fn validate(&self) -> Result<()> {
        if self.max_health == 0 {
            return Err(ConfigError::Habitat {
                name: self.name.to_string(),
                reason: "max_health must be positive".to_string(),
            });
        }
        if self.current_health > self.max_health {
            return Err(ConfigError::Habitat {
                name: self.name.to_string(),
                reason: format!(
                    "current_health {} exceeds max_health {}",
                    self.current_health, self.max_health
                ),
            });
        }
        Ok(())
    }
}
