//! Error types for Verdant.

use thiserror::Error;

use crate::coords::{Cell, GridSize};

/// Errors reported back to the caller of a garden command.
///
/// None of these stop the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GardenError {
    /// Planting onto a cell that already holds a plant
    #[error("cell {cell} is already occupied")]
    CellOccupied {
        /// Target cell
        cell: Cell,
    },

    /// Planting without a chosen plant type
    #[error("no plant type selected")]
    NoTypeSelected,

    /// Unrecognized plant type name
    #[error("unsupported plant type: {0}")]
    UnsupportedPlantType(String),

    /// Unrecognized insect or pest-control agent name
    #[error("unknown insect: {0}")]
    UnknownInsect(String),

    /// Cell outside the garden grid
    #[error("cell {cell} is outside the {size} garden")]
    OutOfBounds {
        /// Requested cell
        cell: Cell,
        /// Garden dimensions
        size: GridSize,
    },

    /// Removing from a cell with no plant
    #[error("no plant at {cell}")]
    EmptyCell {
        /// Requested cell
        cell: Cell,
    },

    /// The simulation worker is no longer accepting commands
    #[error("simulation has stopped")]
    SimulationStopped,
}

/// Result type alias for garden operations.
pub type GardenResult<T> = Result<T, GardenError>;
