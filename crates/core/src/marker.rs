//! Recognition markers.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, MarkerId, OverlayId};

/// Tracking state reported by the recognition collaborator for one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TrackingState {
    /// Marker is located and tracked
    Tracking,
    /// Marker is only partially located
    Limited,
    /// Marker is not located
    #[default]
    None,
}

impl TrackingState {
    /// Only full tracking counts as visible.
    pub fn is_tracking(self) -> bool {
        matches!(self, TrackingState::Tracking)
    }
}

/// A known marker and what it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Marker id (reference image name)
    pub id: MarkerId,

    /// Overlay shown while this marker is the first tracked one
    pub overlay: OverlayId,

    /// Content entity anchored to the marker
    #[serde(default)]
    pub content: Option<EntityId>,
}
