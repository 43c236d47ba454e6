//! Habitat → subject roster used when provisioning a player.

use serde::{Deserialize, Serialize};

use crate::id::{HabitatName, SubjectId};

/// Ordered list of habitats and their quiz subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// Habitats with their subjects
    pub habitats: Vec<(HabitatName, Vec<SubjectId>)>,
}

impl Roster {
    /// Build from `(habitat, [subjects])` pairs.
    pub fn new<H, S>(entries: impl IntoIterator<Item = (H, Vec<S>)>) -> Self
    where
        H: Into<HabitatName>,
        S: Into<SubjectId>,
    {
        Self {
            habitats: entries
                .into_iter()
                .map(|(h, subjects)| {
                    let habitat: HabitatName = h.into();
                    let subjects: Vec<SubjectId> = subjects.into_iter().map(Into::into).collect();
                    (habitat, subjects)
                })
                .collect(),
        }
    }

    /// Iterate over every `(habitat, subject)` pair.
    pub fn pairs(&self) -> impl Iterator<Item = (&HabitatName, &SubjectId)> {
        self.habitats
            .iter()
            .flat_map(|(h, subjects)| subjects.iter().map(move |s| (h, s)))
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new([
            ("Ocean", vec!["Jellyfish", "Sunfish"]),
            ("Arctic", vec!["Penguin", "Polarbear"]),
            ("Mangroove", vec!["Crocodile", "Frog"]),
            ("Coral Reef", vec!["Clownfish", "Mantaray"]),
        ])
    }
}
