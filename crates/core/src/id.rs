//! Identifiers for players, habitats, subjects and world entities.
//!
//! All identifiers are opaque strings supplied by configuration or by the
//! identity collaborator; none are generated locally.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable player identifier issued by the identity collaborator (`uid`).
    PlayerId
);

string_id!(
    /// Habitat name, e.g. `Ocean` or `Coral Reef`. Also a remote path segment.
    HabitatName
);

string_id!(
    /// Quiz subject (an animal name such as `Jellyfish`).
    SubjectId
);

string_id!(
    /// Any entity the router can receive world events about.
    EntityId
);

string_id!(
    /// Recognition marker (reference image) name.
    MarkerId
);

string_id!(
    /// Overlay canvas shown while a marker is tracked.
    OverlayId
);
