//! Habitat health meter.

use reefwarden_core::{EntityId, HabitatConfig, HabitatName};
use tracing::{debug, info};

use crate::error::HabitatError;

/// Health gained per cleaned piece of trash.
pub const CLEAN_AMOUNT: u32 = 10;

/// Health gained per accepted feeding.
pub const FEED_AMOUNT: u32 = 50;

/// What a successful Clean or Feed did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthChange {
    /// Habitat
    pub habitat: HabitatName,
    /// Health after the change
    pub health: u32,
    /// Meter maximum
    pub max: u32,
    /// Content to ensure visible; empty unless the meter is full
    pub unlock: Vec<EntityId>,
}

impl HealthChange {
    /// Whether this change carries an unlock.
    pub fn unlocked(&self) -> bool {
        !self.unlock.is_empty()
    }
}

/// Live health state of one habitat.
///
/// Health stays within `0..=max_health`. Unlocking is level-triggered: every
/// Clean or Feed that leaves the meter full reports the unlock set again,
/// and consumers must treat it as "ensure visible".
#[derive(Debug, Clone)]
pub struct HabitatState {
    name: HabitatName,
    current_health: u32,
    max_health: u32,
    required_health_for_feed: u32,
    unlocks: Vec<EntityId>,
}

impl HabitatState {
    /// Start from configuration.
    pub fn from_config(config: &HabitatConfig) -> Self {
        Self {
            name: config.name.clone(),
            current_health: config.current_health.min(config.max_health),
            max_health: config.max_health,
            required_health_for_feed: config.required_health_for_feed,
            unlocks: config.unlocks.clone(),
        }
    }

    /// Habitat name.
    pub fn name(&self) -> &HabitatName {
        &self.name
    }

    /// Current health.
    pub fn health(&self) -> u32 {
        self.current_health
    }

    /// Meter maximum.
    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Feed threshold.
    pub fn required_health_for_feed(&self) -> u32 {
        self.required_health_for_feed
    }

    /// Whether a Feed would be accepted now.
    pub fn can_feed(&self) -> bool {
        self.current_health >= self.required_health_for_feed
    }

    /// Trash cleaned: +10, clamped.
    pub fn clean(&mut self) -> HealthChange {
        self.raise(CLEAN_AMOUNT);
        debug!("{} health increased! Now: {}", self.name, self.current_health);
        self.change()
    }

    /// Feed accepted at or above the threshold: +50, clamped.
    pub fn feed(&mut self) -> Result<HealthChange, HabitatError> {
        if !self.can_feed() {
            info!(
                "{} health too low to feed ({} < {})",
                self.name, self.current_health, self.required_health_for_feed
            );
            return Err(HabitatError::FeedDenied {
                health: self.current_health,
                required: self.required_health_for_feed,
            });
        }
        self.raise(FEED_AMOUNT);
        debug!("{} fed! Health now: {}", self.name, self.current_health);
        Ok(self.change())
    }

    fn raise(&mut self, amount: u32) {
        self.current_health = self.current_health.saturating_add(amount).min(self.max_health);
    }

    fn change(&self) -> HealthChange {
        let unlock = if self.current_health == self.max_health {
            self.unlocks.clone()
        } else {
            Vec::new()
        };
        HealthChange {
            habitat: self.name.clone(),
            health: self.current_health,
            max: self.max_health,
            unlock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habitat(current: u32) -> HabitatState {
        let mut cfg = HabitatConfig::new("Ocean")
            .with_unlocks([EntityId::new("fish-1"), EntityId::new("fish-2")]);
        cfg.current_health = current;
        HabitatState::from_config(&cfg)
    }

    #[test]
    fn test_scenario_feed_gating_and_clamp() {
        let mut h = habitat(0);

        assert_eq!(
            h.feed(),
            Err(HabitatError::FeedDenied { health: 0, required: 50 })
        );
        assert_eq!(h.health(), 0);

        h.clean();
        h.clean();
        assert_eq!(h.health(), 20);

        assert!(h.feed().is_err());
        assert_eq!(h.health(), 20);

        for _ in 0..5 {
            let change = h.clean();
            assert!(!change.unlocked());
        }
        assert_eq!(h.health(), 70);

        let change = h.feed().unwrap();
        assert_eq!(change.health, 100);
        assert_eq!(h.health(), 100);
        assert_eq!(change.unlock, vec![EntityId::new("fish-1"), EntityId::new("fish-2")]);
    }

    #[test]
    fn test_unlock_repeats_while_full() {
        let mut h = habitat(100);
        for _ in 0..3 {
            let change = h.clean();
            assert_eq!(change.health, 100);
            assert!(change.unlocked());
        }
        assert!(h.feed().unwrap().unlocked());
    }

    #[test]
    fn test_clean_reaching_max_exactly_unlocks() {
        let mut h = habitat(90);
        assert!(h.clean().unlocked());
    }

    #[test]
    fn test_clean_overshooting_max_unlocks() {
        let mut h = habitat(95);
        let change = h.clean();
        assert_eq!(change.health, 100);
        assert!(change.unlocked());
    }

    #[test]
    fn test_feed_at_threshold_accepted() {
        let mut h = habitat(50);
        assert_eq!(h.feed().unwrap().health, 100);
    }

    #[test]
    fn test_health_stays_in_bounds_for_any_sequence() {
        // Deterministic walk over mixed Clean/Feed sequences
        for seed in 0u32..64 {
            let mut h = habitat(0);
            let mut bits = seed;
            for _ in 0..20 {
                if bits & 1 == 0 {
                    h.clean();
                } else {
                    let before = h.health();
                    if h.feed().is_err() {
                        assert_eq!(h.health(), before);
                    }
                }
                bits = bits.rotate_right(1) ^ 0b1011;
                assert!(h.health() <= h.max_health());
            }
        }
    }

    #[test]
    fn test_overfull_config_clamped() {
        let mut cfg = HabitatConfig::new("Ocean");
        cfg.current_health = 500;
        assert_eq!(HabitatState::from_config(&cfg).health(), 100);
    }
}
