//! Garden grid: cell ownership of plants and per-cell transient state.

use tracing::debug;

use verdant_common::{Cell, GardenError, GardenResult, GridSize, PlantId};

use crate::insects::{Insect, InsectCatalog};
use crate::plant::{PlantModel, PlantType};
use crate::stats::StatsAccumulator;

/// Transient per-cell markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellFlag {
    /// Watering in progress
    Watering,
    /// Pest control in progress
    PestControl,
}

impl CellFlag {
    /// Returns the icon shown while the flag is set.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Watering => "💧",
            Self::PestControl => "🧴",
        }
    }
}

/// Everything the garden tracks for one cell.
#[derive(Debug, Clone, Default)]
pub struct CellState {
    plant: Option<PlantModel>,
    insects: Vec<Insect>,
    watering: bool,
    pest_control: bool,
}

impl CellState {
    fn clear(&mut self) -> Option<PlantModel> {
        self.insects.clear();
        self.watering = false;
        self.pest_control = false;
        self.plant.take()
    }

    fn flag_mut(&mut self, flag: CellFlag) -> &mut bool {
        match flag {
            CellFlag::Watering => &mut self.watering,
            CellFlag::PestControl => &mut self.pest_control,
        }
    }
}

/// A bounded grid of cells, each holding at most one plant.
///
/// The garden exclusively owns its plants until they are removed or die.
#[derive(Debug, Clone)]
pub struct Garden {
    size: GridSize,
    cells: Vec<CellState>,
    catalog: InsectCatalog,
    last_id: PlantId,
    totals: StatsAccumulator,
}

impl Default for Garden {
    fn default() -> Self {
        Self::new(GridSize::default())
    }
}

impl Garden {
    /// Creates an empty garden.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![CellState::default(); size.cell_count()],
            catalog: InsectCatalog::new(),
            last_id: PlantId::NULL,
            totals: StatsAccumulator::default(),
        }
    }

    /// Grid dimensions.
    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// The insect catalog used for damage lookups.
    #[must_use]
    pub fn catalog(&self) -> &InsectCatalog {
        &self.catalog
    }

    /// Cumulative counters.
    #[must_use]
    pub fn totals(&self) -> &StatsAccumulator {
        &self.totals
    }

    /// Mutable cumulative counters.
    pub fn totals_mut(&mut self) -> &mut StatsAccumulator {
        &mut self.totals
    }

    fn slot(&self, cell: Cell) -> Option<&CellState> {
        self.size.index_of(cell).and_then(|i| self.cells.get(i))
    }

    fn slot_mut(&mut self, cell: Cell) -> Option<&mut CellState> {
        self.size.index_of(cell).and_then(|i| self.cells.get_mut(i))
    }

    /// Plants a new plant of `plant_type` at `cell`.
    pub fn plant(
        &mut self,
        cell: Cell,
        plant_type: Option<PlantType>,
    ) -> GardenResult<&PlantModel> {
        let size = self.size;
        let id = self.last_id.next();
        let slot = self
            .size
            .index_of(cell)
            .and_then(|i| self.cells.get_mut(i))
            .ok_or(GardenError::OutOfBounds { cell, size })?;

        if slot.plant.is_some() {
            return Err(GardenError::CellOccupied { cell });
        }
        let plant_type = plant_type.ok_or(GardenError::NoTypeSelected)?;

        let name = format!("{} {}", plant_type.display_name(), cell.to_index(size.cols));
        slot.clear();
        let plant = slot.plant.insert(PlantModel::new(id, name, plant_type));
        self.last_id = id;
        self.totals.planted += 1;
        debug!("Planted {} at {}", plant.name(), cell);
        Ok(plant)
    }

    /// Detaches the plant at `cell` and clears all transient cell state.
    pub fn remove(&mut self, cell: Cell) -> Option<PlantModel> {
        self.slot_mut(cell).and_then(CellState::clear)
    }

    /// Plant occupying `cell`, if any.
    #[must_use]
    pub fn plant_at(&self, cell: Cell) -> Option<&PlantModel> {
        self.slot(cell).and_then(|s| s.plant.as_ref())
    }

    /// Mutable plant occupying `cell`, if any.
    pub fn plant_at_mut(&mut self, cell: Cell) -> Option<&mut PlantModel> {
        self.slot_mut(cell).and_then(|s| s.plant.as_mut())
    }

    /// Returns true if `cell` holds a plant.
    #[must_use]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.plant_at(cell).is_some()
    }

    /// Insects currently afflicting `cell`.
    #[must_use]
    pub fn insects_at(&self, cell: Cell) -> &[Insect] {
        self.slot(cell).map_or(&[][..], |s| s.insects.as_slice())
    }

    /// Applies one insect attack to the plant at `cell`.
    ///
    /// Returns the damage dealt; 0 when the cell is empty or the plant is immune,
    /// in which case nothing changes.
    pub fn apply_insect_damage(&mut self, cell: Cell, insect: Insect) -> u32 {
        let catalog = self.catalog;
        let Some(slot) = self.slot_mut(cell) else {
            return 0;
        };
        let Some(plant) = slot.plant.as_mut() else {
            return 0;
        };

        let damage = catalog.damage(insect, plant.plant_type());
        if damage > 0 {
            plant.decrease_health(damage);
            if !slot.insects.contains(&insect) {
                slot.insects.push(insect);
            }
        }
        damage
    }

    /// Removes the plant at `cell` if its health has reached zero.
    ///
    /// Returns the dead plant so the caller can report it.
    pub fn check_and_handle_death(&mut self, cell: Cell) -> Option<PlantModel> {
        if !self.plant_at(cell).is_some_and(PlantModel::is_dead) {
            return None;
        }
        let dead = self.remove(cell)?;
        self.totals.died += 1;
        debug!("{} died at {}", dead.name(), cell);
        Some(dead)
    }

    /// Iterates over occupied cells and their plants, in row-major order.
    pub fn plants(&self) -> impl Iterator<Item = (Cell, &PlantModel)> + '_ {
        let cols = self.size.cols;
        self.cells.iter().enumerate().filter_map(move |(i, slot)| {
            slot.plant
                .as_ref()
                .map(|plant| (Cell::from_index(i, cols), plant))
        })
    }

    /// Occupied cells, in row-major order.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<Cell> {
        self.plants().map(|(cell, _)| cell).collect()
    }

    /// Number of live plants.
    #[must_use]
    pub fn plant_count(&self) -> usize {
        self.plants().count()
    }

    /// Returns true if no cell holds a plant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plants().next().is_none()
    }

    /// Cells with a non-empty active-insect list.
    #[must_use]
    pub fn infested_cells(&self) -> Vec<Cell> {
        let cols = self.size.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.insects.is_empty())
            .map(|(i, _)| Cell::from_index(i, cols))
            .collect()
    }

    /// Removes the given insects from `cell`, returning those actually present.
    pub fn remove_insects(&mut self, cell: Cell, agents: &[Insect]) -> Vec<Insect> {
        let Some(slot) = self.slot_mut(cell) else {
            return Vec::new();
        };
        let (removed, retained): (Vec<Insect>, Vec<Insect>) = slot
            .insects
            .iter()
            .copied()
            .partition(|insect| agents.contains(insect));
        slot.insects = retained;
        removed
    }

    /// Reads a transient flag.
    #[must_use]
    pub fn flag(&self, cell: Cell, flag: CellFlag) -> bool {
        self.slot(cell).is_some_and(|s| match flag {
            CellFlag::Watering => s.watering,
            CellFlag::PestControl => s.pest_control,
        })
    }

    /// Sets or clears a transient flag. Empty cells are left untouched.
    pub fn set_flag(&mut self, cell: Cell, flag: CellFlag, value: bool) {
        if let Some(slot) = self.slot_mut(cell) {
            if slot.plant.is_some() {
                *slot.flag_mut(flag) = value;
            }
        }
    }
}
