//! Plant model: per-plant health, hydration and type data.
//!
//! This module provides:
//! - The closed set of plant types
//! - Type-specific descriptive payloads
//! - Health/water arithmetic with clamping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use verdant_common::{GardenError, PlantId};

/// Maximum plant health.
pub const MAX_HEALTH: u32 = 100;

/// Health of a freshly planted plant.
pub const INITIAL_HEALTH: u32 = 100;

/// Water level of a freshly planted plant.
pub const INITIAL_WATER_LEVEL: u32 = 60;

/// Upper bound of the displayed water level.
pub const MAX_DISPLAY_WATER: u32 = 100;

/// Temperature tolerance shared by every plant type (°C).
pub const TEMPERATURE_TOLERANCE: (i32, i32) = (15, 35);

/// The plant types that can be grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlantType {
    /// Apple tree.
    Apple,
    /// Cherry tree.
    Cherry,
    /// Lavender bush.
    Lavender,
    /// Bamboo cane.
    Bamboo,
    /// Sunflower.
    Sunflower,
}

impl PlantType {
    /// Returns all plant types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Apple,
            Self::Cherry,
            Self::Lavender,
            Self::Bamboo,
            Self::Sunflower,
        ]
    }

    /// Get the display name of this type.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Apple => "Apple",
            Self::Cherry => "Cherry",
            Self::Lavender => "Lavender",
            Self::Bamboo => "Bamboo",
            Self::Sunflower => "Sunflower",
        }
    }

    /// Returns the icon for this type.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Apple => "🍏",
            Self::Cherry => "🍒",
            Self::Lavender => "🌸",
            Self::Bamboo => "🎍",
            Self::Sunflower => "🌻",
        }
    }

    /// Base water consumed per decay cycle.
    #[must_use]
    pub const fn water_requirement(self) -> u32 {
        match self {
            Self::Sunflower => 8,
            _ => 5,
        }
    }

    /// Type-specific payload for a new plant of this type.
    #[must_use]
    pub fn default_traits(self) -> PlantTraits {
        match self {
            Self::Apple => PlantTraits::Fruiting {
                height_cm: 200,
                growth_rate_cm: 12,
                fruit_yield: 150,
            },
            Self::Cherry => PlantTraits::Fruiting {
                height_cm: 180,
                growth_rate_cm: 10,
                fruit_yield: 200,
            },
            Self::Lavender => PlantTraits::Fragrant {
                density: 20,
                trimming_days: 30,
                fragrance: "Calming Scent".to_string(),
            },
            Self::Bamboo => PlantTraits::Cane {
                height_cm: 250,
                growth_rate_cm: 20,
            },
            Self::Sunflower => PlantTraits::Heliotropic {
                density: 60,
                trimming_days: 30,
                heliotropic: true,
            },
        }
    }

    /// Flavor text describing what the plant does as it grows.
    #[must_use]
    pub const fn growth_message(self) -> &'static str {
        match self {
            Self::Apple => "is growing and producing apples",
            Self::Cherry => "is blossoming and setting cherries",
            Self::Lavender => "is spreading its calming scent",
            Self::Bamboo => "is shooting upwards",
            Self::Sunflower => "is following the sun and growing taller",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PlantType {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GardenError::UnsupportedPlantType(s.trim().to_string()))
    }
}

/// Descriptive, type-specific plant data.
///
/// Purely informational; no rule in the simulation branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantTraits {
    /// Fruit trees (apple, cherry).
    Fruiting {
        /// Height in cm
        height_cm: u32,
        /// Growth per day in cm
        growth_rate_cm: u32,
        /// Expected fruit yield
        fruit_yield: u32,
    },
    /// Scented bushes (lavender).
    Fragrant {
        /// Bush density
        density: u32,
        /// Days between trims
        trimming_days: u32,
        /// Scent description
        fragrance: String,
    },
    /// Fast-growing canes (bamboo).
    Cane {
        /// Height in cm
        height_cm: u32,
        /// Growth per day in cm
        growth_rate_cm: u32,
    },
    /// Sun-tracking flowers (sunflower).
    Heliotropic {
        /// Bush density
        density: u32,
        /// Days between trims
        trimming_days: u32,
        /// Whether the head tracks the sun
        heliotropic: bool,
    },
}

impl PlantTraits {
    /// Care instructions for this kind of plant.
    #[must_use]
    pub const fn care_instructions(&self) -> &'static str {
        match self {
            Self::Fruiting { .. } => {
                "Regular watering, pruning, pest monitoring, and sufficient sunlight."
            },
            Self::Fragrant { .. } => "Well-drained soil, light watering, and regular trimming.",
            Self::Cane { .. } => "Plenty of water and room to spread.",
            Self::Heliotropic { .. } => {
                "Regular watering, full sunlight exposure, and protection from strong winds."
            },
        }
    }
}

/// A planted plant and its mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantModel {
    id: PlantId,
    name: String,
    plant_type: PlantType,
    health: u32,
    water_level: u32,
    water_requirement: u32,
    temperature_tolerance: (i32, i32),
    traits: PlantTraits,
}

impl PlantModel {
    /// Creates a plant with the defaults for its type.
    #[must_use]
    pub fn new(id: PlantId, name: impl Into<String>, plant_type: PlantType) -> Self {
        Self {
            id,
            name: name.into(),
            plant_type,
            health: INITIAL_HEALTH,
            water_level: INITIAL_WATER_LEVEL,
            water_requirement: plant_type.water_requirement(),
            temperature_tolerance: TEMPERATURE_TOLERANCE,
            traits: plant_type.default_traits(),
        }
    }

    /// Sets the starting water level.
    #[must_use]
    pub fn with_water_level(mut self, level: u32) -> Self {
        self.water_level = level;
        self
    }

    /// Sets the starting health, clamped to the valid range.
    #[must_use]
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health.min(MAX_HEALTH);
        self
    }

    /// Adds water. No upper clamp: callers check for overwatering afterwards.
    pub fn water(&mut self, amount: u32) {
        self.water_level = self.water_level.saturating_add(amount);
    }

    /// Removes water, never going below zero.
    pub fn decrease_water_level(&mut self, amount: u32) {
        self.water_level = self.water_level.saturating_sub(amount);
    }

    /// Lowers health, never going below zero.
    pub fn decrease_health(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Raises health, capped at [`MAX_HEALTH`].
    pub fn increase_health(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(MAX_HEALTH);
    }

    /// Plant id.
    #[must_use]
    pub fn id(&self) -> PlantId {
        self.id
    }

    /// Plant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plant type.
    #[must_use]
    pub fn plant_type(&self) -> PlantType {
        self.plant_type
    }

    /// Current health (0-100).
    #[must_use]
    pub fn health(&self) -> u32 {
        self.health
    }

    /// Water level as displayed, clamped to 0-100.
    #[must_use]
    pub fn water_level(&self) -> u32 {
        self.water_level.min(MAX_DISPLAY_WATER)
    }

    /// Stored water level, which may briefly exceed 100 after watering.
    #[must_use]
    pub fn raw_water_level(&self) -> u32 {
        self.water_level
    }

    /// Base water consumption per decay cycle.
    #[must_use]
    pub fn water_requirement(&self) -> u32 {
        self.water_requirement
    }

    /// Tolerated temperature range (low, high) in °C.
    #[must_use]
    pub fn temperature_tolerance(&self) -> (i32, i32) {
        self.temperature_tolerance
    }

    /// Type-specific payload.
    #[must_use]
    pub fn traits(&self) -> &PlantTraits {
        &self.traits
    }

    /// Returns true once health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}
