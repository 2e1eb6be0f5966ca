//! Insect catalog: which pests hurt which plants, and by how much.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use verdant_common::GardenError;

use crate::plant::PlantType;

/// Insects that can attack the garden.
///
/// Pest-control agents are named after the insect they target, so the same
/// enum identifies both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Insect {
    /// Aphid
    Aphid,
    /// Ant
    Ant,
    /// Grasshopper
    Grasshopper,
    /// Ladybug
    Ladybug,
}

impl Insect {
    /// Returns all insects.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Aphid, Self::Ant, Self::Grasshopper, Self::Ladybug]
    }

    /// Get the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aphid => "Aphid",
            Self::Ant => "Ant",
            Self::Grasshopper => "Grasshopper",
            Self::Ladybug => "Ladybug",
        }
    }

    /// Returns the icon for this insect.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Aphid => "🪲",
            Self::Ant => "🐜",
            Self::Grasshopper => "🦗",
            Self::Ladybug => "🐞",
        }
    }
}

impl fmt::Display for Insect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Insect {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|i| i.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GardenError::UnknownInsect(s.trim().to_string()))
    }
}

/// Damage dealt per attack, by insect and plant type. Missing pairs are harmless.
const DAMAGE_TABLE: &[(Insect, PlantType, u32)] = &[
    (Insect::Aphid, PlantType::Apple, 10),
    (Insect::Aphid, PlantType::Cherry, 15),
    (Insect::Aphid, PlantType::Sunflower, 12),
    (Insect::Ant, PlantType::Apple, 8),
    (Insect::Ant, PlantType::Bamboo, 12),
    (Insect::Grasshopper, PlantType::Cherry, 10),
    (Insect::Grasshopper, PlantType::Bamboo, 7),
    (Insect::Grasshopper, PlantType::Sunflower, 15),
    (Insect::Ladybug, PlantType::Lavender, 20),
];

/// Immutable lookup of insect damage.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsectCatalog;

impl InsectCatalog {
    /// Creates the catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Damage `insect` deals to a plant of `plant_type`, 0 if harmless.
    #[must_use]
    pub fn damage(&self, insect: Insect, plant_type: PlantType) -> u32 {
        DAMAGE_TABLE
            .iter()
            .find(|(i, t, _)| *i == insect && *t == plant_type)
            .map_or(0, |(_, _, damage)| *damage)
    }

    /// Insects that can damage `plant_type`, in catalog order.
    #[must_use]
    pub fn vulnerabilities(&self, plant_type: PlantType) -> Vec<Insect> {
        Insect::all()
            .iter()
            .copied()
            .filter(|insect| self.damage(*insect, plant_type) > 0)
            .collect()
    }

    /// Every insect in the catalog.
    #[must_use]
    pub fn insects(&self) -> &'static [Insect] {
        Insect::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_lookup() {
        let catalog = InsectCatalog::new();
        assert_eq!(catalog.damage(Insect::Aphid, PlantType::Cherry), 15);
        assert_eq!(catalog.damage(Insect::Ladybug, PlantType::Lavender), 20);
        assert_eq!(catalog.damage(Insect::Ladybug, PlantType::Apple), 0);
        assert_eq!(catalog.damage(Insect::Ant, PlantType::Sunflower), 0);
    }

    #[test]
    fn test_vulnerabilities() {
        let catalog = InsectCatalog::new();
        assert_eq!(
            catalog.vulnerabilities(PlantType::Apple),
            vec![Insect::Aphid, Insect::Ant]
        );
        assert_eq!(
            catalog.vulnerabilities(PlantType::Bamboo),
            vec![Insect::Ant, Insect::Grasshopper]
        );
        assert_eq!(
            catalog.vulnerabilities(PlantType::Lavender),
            vec![Insect::Ladybug]
        );
    }

    #[test]
    fn test_insect_parsing() {
        assert_eq!("grasshopper".parse::<Insect>(), Ok(Insect::Grasshopper));
        assert!(matches!(
            "beetle".parse::<Insect>(),
            Err(GardenError::UnknownInsect(_))
        ));
    }
}
