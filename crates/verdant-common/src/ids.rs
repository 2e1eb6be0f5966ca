//! ID types for garden entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a planted plant.
///
/// Ids are handed out by the garden in planting order and never reused, so a
/// delayed task can tell whether the plant it was scheduled for is still the
/// one occupying a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlantId(u64);

impl PlantId {
    /// Null/invalid plant ID.
    pub const NULL: Self = Self(0);

    /// Creates a plant ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid (non-null) plant ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Returns the id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for PlantId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
