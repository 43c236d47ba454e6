//! Marker overlays - at most one visible, first tracked marker wins.

use std::collections::HashMap;

use reefwarden_core::{Command, MarkerConfig, MarkerId, OverlayId, TrackingState};
use tracing::debug;

/// Tracks marker states and decides which overlay is visible.
///
/// The winner is the first marker in configuration order that is currently
/// `Tracking`, not the most recently updated one.
#[derive(Debug, Clone)]
pub struct OverlayTracker {
    markers: Vec<MarkerConfig>,
    states: HashMap<MarkerId, TrackingState>,
    visible: Option<OverlayId>,
}

impl OverlayTracker {
    /// Track the given markers; all start untracked with no overlay shown.
    pub fn new(markers: Vec<MarkerConfig>) -> Self {
        Self {
            markers,
            states: HashMap::new(),
            visible: None,
        }
    }

    /// Overlay currently shown.
    pub fn visible(&self) -> Option<&OverlayId> {
        self.visible.as_ref()
    }

    /// Last known state of a marker.
    pub fn state(&self, marker: &MarkerId) -> TrackingState {
        self.states.get(marker).copied().unwrap_or_default()
    }

    /// Apply a state change and return the commands it causes.
    pub fn update(&mut self, marker: &MarkerId, state: TrackingState) -> Vec<Command> {
        let Some(config) = self.markers.iter().find(|m| &m.id == marker) else {
            debug!("Ignoring unknown marker {}", marker);
            return Vec::new();
        };
        let content = config.content.clone();
        let previous = self.states.insert(marker.clone(), state).unwrap_or_default();

        let mut commands = Vec::new();
        if let Some(content) = content {
            if state.is_tracking() && !previous.is_tracking() {
                commands.push(Command::Activate { entities: vec![content] });
            } else if !state.is_tracking() && previous.is_tracking() {
                commands.push(Command::Deactivate { entities: vec![content] });
            }
        }

        let winner = self
            .markers
            .iter()
            .find(|m| self.state(&m.id).is_tracking())
            .map(|m| m.overlay.clone());

        if winner != self.visible {
            commands.push(match &winner {
                Some(overlay) => Command::ShowOverlay { overlay: overlay.clone() },
                None => Command::HideAllOverlays,
            });
            self.visible = winner;
        }
        commands
    }
}
