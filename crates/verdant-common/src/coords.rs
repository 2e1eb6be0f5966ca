//! Grid coordinate types for the garden.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of grid rows.
pub const DEFAULT_ROWS: u16 = 8;

/// Default number of grid columns.
pub const DEFAULT_COLS: u16 = 8;

/// A single garden cell, addressed by row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row index (0 = top)
    pub row: u16,
    /// Column index (0 = left)
    pub col: u16,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Converts to a linear index for arena access.
    #[must_use]
    pub const fn to_index(self, cols: u16) -> usize {
        (self.row as usize) * (cols as usize) + (self.col as usize)
    }

    /// Creates from a linear index.
    #[must_use]
    pub const fn from_index(index: usize, cols: u16) -> Self {
        let cols = cols as usize;
        Self {
            row: (index / cols) as u16,
            col: (index % cols) as u16,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Dimensions of the garden grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows
    pub rows: u16,
    /// Number of columns
    pub cols: u16,
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    /// Returns true if the cell lies inside the grid.
    #[must_use]
    pub const fn contains(self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Linear index of a cell, or `None` if it is outside the grid.
    #[must_use]
    pub fn index_of(self, cell: Cell) -> Option<usize> {
        self.contains(cell).then(|| cell.to_index(self.cols))
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        (0..self.cell_count()).map(move |i| Cell::from_index(i, self.cols))
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
