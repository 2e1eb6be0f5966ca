//! Pest control: removes insects matching the selected agents.

use tracing::{debug, warn};

use verdant_common::{Cell, PlantId};

use crate::garden::{CellFlag, Garden};
use crate::insects::Insect;

/// What triggered a pest-control pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PestControlOrigin {
    /// Scheduled after a random attack
    Automatic,
    /// Requested by command
    Manual,
}

/// The outcome of pest control on one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PestControlAction {
    /// Treated cell
    pub cell: Cell,
    /// Plant occupying the cell when it was treated
    pub plant: PlantId,
    /// Name of that plant
    pub plant_name: String,
    /// Insects removed from the cell
    pub removed: Vec<Insect>,
}

/// Maps pest-control agent selections onto insect removal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PestControlResolver;

impl PestControlResolver {
    /// Removes every insect named in `agents` from every infested cell.
    ///
    /// Cells that lost at least one insect get the pest-control flag and are
    /// returned as actions; the caller schedules the flag clear and arms
    /// recovery. A manual pass counts once towards the pest-control total.
    pub fn resolve(
        garden: &mut Garden,
        agents: &[Insect],
        origin: PestControlOrigin,
    ) -> Vec<PestControlAction> {
        if agents.is_empty() {
            if origin == PestControlOrigin::Manual {
                warn!("Pest control requested with no agents selected");
            }
            return Vec::new();
        }
        if origin == PestControlOrigin::Manual {
            garden.totals_mut().pest_controls_applied += 1;
        }

        let mut actions = Vec::new();
        for cell in garden.infested_cells() {
            let removed = garden.remove_insects(cell, agents);
            if removed.is_empty() {
                continue;
            }
            let Some(plant) = garden.plant_at(cell) else {
                continue;
            };
            let action = PestControlAction {
                cell,
                plant: plant.id(),
                plant_name: plant.name().to_string(),
                removed,
            };
            garden.set_flag(cell, CellFlag::PestControl, true);
            debug!(?origin, "Treated {} at {}", action.plant_name, cell);
            actions.push(action);
        }
        actions
    }
}
