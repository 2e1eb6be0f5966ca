//! The single-writer engine.
//!
//! The engine owns the garden, the clock and the random source. It is only
//! ever touched by the worker thread, one intent at a time, so no rule below
//! needs a lock. Every handler reports what happened through [`Effects`].

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};

use verdant_common::{Cell, GardenError, GardenResult, PlantId};

use crate::clock::SimulationClock;
use crate::config::SimConfig;
use crate::events::EventCategory;
use crate::garden::{CellFlag, Garden};
use crate::insects::Insect;
use crate::intent::{CellTask, Directive, Effects, Intent};
use crate::pest_control::{PestControlAction, PestControlOrigin, PestControlResolver};
use crate::plant::{PlantModel, PlantTraits, PlantType, MAX_HEALTH};
use crate::rules;
use crate::scheduler::{FLAG_CLEAR_DELAY, PEST_CONTROL_DELAY};
use crate::stats::GardenReport;

/// Read-only view of one plant for collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantDetails {
    /// Plant id
    pub id: PlantId,
    /// Plant name
    pub name: String,
    /// Plant type
    pub plant_type: PlantType,
    /// Current health
    pub health: u32,
    /// Displayed water level
    pub water_level: u32,
    /// Base water consumption
    pub water_requirement: u32,
    /// Insects that can damage this plant
    pub vulnerabilities: Vec<Insect>,
    /// Insects currently afflicting it
    pub active_insects: Vec<Insect>,
    /// Grid position
    pub cell: Cell,
    /// Watering in progress
    pub watering: bool,
    /// Pest control in progress
    pub pest_control: bool,
    /// Descriptive payload
    pub traits: PlantTraits,
    /// Care advice for this kind of plant
    pub care_instructions: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaterSource {
    Manual,
    Automatic,
}

/// Garden state plus the rules that mutate it.
#[derive(Debug)]
pub struct Engine {
    garden: Garden,
    clock: SimulationClock,
    rng: fastrand::Rng,
    generations: HashMap<(CellTask, Cell), u64>,
    next_generation: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&SimConfig::default())
    }
}

impl Engine {
    /// Creates an engine with an empty garden.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            garden: Garden::new(config.grid_size()),
            clock: SimulationClock::new(config.initial_temperature),
            rng,
            generations: HashMap::new(),
            next_generation: 0,
        }
    }

    /// The garden.
    #[must_use]
    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    /// Mutable garden, for commands that bypass the rules.
    pub fn garden_mut(&mut self) -> &mut Garden {
        &mut self.garden
    }

    /// The clock.
    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Applies one intent and returns what it produced.
    pub fn apply(&mut self, intent: Intent) -> Effects {
        let mut effects = Effects::new();
        if intent.is_timer() {
            self.clock.tick();
        }
        trace!(?intent, "Applying intent");

        match intent {
            Intent::WaterDecay => self.water_decay(&mut effects),
            Intent::AdvanceDay => self.advance_day(&mut effects),
            Intent::InsectAttack => self.random_attack(&mut effects),
            Intent::AutoPestControl => self.automatic_pest_control(&mut effects),
            Intent::AutoWater { cell, generation } => {
                self.auto_water(cell, generation, &mut effects);
            },
            Intent::Recover { cell, generation } => self.recover(cell, generation, &mut effects),
            Intent::ClearFlag { cell, flag, plant } => {
                self.clear_flag(cell, flag, plant, &mut effects);
            },
            Intent::Command(command) => command(self, &mut effects),
            Intent::Shutdown => {},
        }
        effects
    }

    // === Per-cell task registry ===

    /// Arms (or re-arms) a periodic task, superseding any earlier one.
    pub fn arm(&mut self, task: CellTask, cell: Cell, effects: &mut Effects) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.generations.insert((task, cell), generation);
        effects.direct(Directive::Arm {
            task,
            cell,
            generation,
        });
        generation
    }

    /// Disarms a periodic task if it is armed.
    pub fn disarm(&mut self, task: CellTask, cell: Cell, effects: &mut Effects) {
        if self.generations.remove(&(task, cell)).is_some() {
            effects.direct(Directive::Disarm { task, cell });
        }
    }

    /// Returns true if a periodic task is armed for `(task, cell)`.
    #[must_use]
    pub fn is_armed(&self, task: CellTask, cell: Cell) -> bool {
        self.generations.contains_key(&(task, cell))
    }

    fn is_current(&self, task: CellTask, cell: Cell, generation: u64) -> bool {
        self.generations.get(&(task, cell)) == Some(&generation)
    }

    fn disarm_cell(&mut self, cell: Cell, effects: &mut Effects) {
        self.disarm(CellTask::Watering, cell, effects);
        self.disarm(CellTask::Recovery, cell, effects);
    }

    fn arm_recovery(&mut self, cell: Cell, effects: &mut Effects) {
        if self
            .garden
            .plant_at(cell)
            .is_some_and(|p| p.health() < MAX_HEALTH)
        {
            self.arm(CellTask::Recovery, cell, effects);
        }
    }

    // === Shared mutations ===

    fn handle_death(&mut self, cell: Cell, effects: &mut Effects) -> bool {
        let Some(dead) = self.garden.check_and_handle_death(cell) else {
            return false;
        };
        effects.important(
            EventCategory::Death,
            format!("{} at {cell} has died", dead.name()),
        );
        self.disarm_cell(cell, effects);
        true
    }

    fn apply_water(
        &mut self,
        cell: Cell,
        amount: u32,
        source: WaterSource,
        effects: &mut Effects,
    ) -> bool {
        let Some(plant) = self.garden.plant_at_mut(cell) else {
            return false;
        };
        plant.water(amount);
        let level = plant.raw_water_level();
        let overwatered = level > rules::OVERWATER_THRESHOLD;
        let damage = rules::overwater_damage(level);
        if overwatered {
            plant.decrease_health(damage);
        }
        let (id, name, display_level, health) = (
            plant.id(),
            plant.name().to_string(),
            plant.water_level(),
            plant.health(),
        );

        self.garden.set_flag(cell, CellFlag::Watering, true);
        effects.direct(Directive::ClearFlagAfter {
            cell,
            flag: CellFlag::Watering,
            plant: id,
            delay: FLAG_CLEAR_DELAY,
        });

        match source {
            WaterSource::Manual => effects.ordinary(
                EventCategory::Watering,
                format!(
                    "Added {amount} units of water to {name}. Current water level: {display_level}%"
                ),
            ),
            WaterSource::Automatic => effects.ordinary(
                EventCategory::AutoWatering,
                format!("Automatic watering applied {amount} units of water to {name}"),
            ),
        }

        if overwatered {
            effects.ordinary(
                EventCategory::Overwatering,
                format!(
                    "{name} is showing signs of overwatering! Health decreased by {damage}%. \
                     Current health: {health}%"
                ),
            );
            self.handle_death(cell, effects);
        }
        true
    }

    fn attack_cell(&mut self, cell: Cell, insect: Insect, effects: &mut Effects) -> u32 {
        let damage = self.garden.apply_insect_damage(cell, insect);
        if damage == 0 {
            return 0;
        }
        let Some(plant) = self.garden.plant_at(cell) else {
            return damage;
        };
        let health = plant.health();
        if rules::is_severe_damage(damage, health) {
            effects.important(
                EventCategory::InsectAttack,
                format!(
                    "SEVERE INSECT DAMAGE: {insect} hit {} at {cell} for -{damage} HP. \
                     Current health: {health}%",
                    plant.name()
                ),
            );
        } else {
            effects.ordinary(
                EventCategory::InsectAttack,
                format!(
                    "{insect} attacked {} at {cell} for -{damage} HP. Current health: {health}%",
                    plant.name()
                ),
            );
        }
        self.handle_death(cell, effects);
        damage
    }

    fn record_pest_control(
        &mut self,
        actions: &[PestControlAction],
        origin: PestControlOrigin,
        effects: &mut Effects,
    ) {
        for action in actions {
            let removed = action
                .removed
                .iter()
                .map(|insect| insect.name())
                .collect::<Vec<_>>()
                .join(", ");
            let label = match origin {
                PestControlOrigin::Automatic => "Automatic pest control",
                PestControlOrigin::Manual => "Pest control",
            };
            effects.ordinary(
                EventCategory::PestControl,
                format!(
                    "{label} removed {removed} from {} at {}",
                    action.plant_name, action.cell
                ),
            );
            effects.direct(Directive::ClearFlagAfter {
                cell: action.cell,
                flag: CellFlag::PestControl,
                plant: action.plant,
                delay: FLAG_CLEAR_DELAY,
            });
            self.arm_recovery(action.cell, effects);
        }
    }

    // === Timer handlers ===

    fn water_decay(&mut self, effects: &mut Effects) {
        let temperature = self.clock.temperature();
        for cell in self.garden.occupied_cells() {
            let Some(plant) = self.garden.plant_at_mut(cell) else {
                continue;
            };
            let reduction = rules::water_decay(plant.water_requirement(), temperature);
            plant.decrease_water_level(reduction);
            let level = plant.raw_water_level();
            let stress = (level < rules::DROUGHT_THRESHOLD).then(|| {
                let impact = rules::drought_damage(level, temperature);
                plant.decrease_health(impact);
                (impact, plant.health())
            });
            let name = plant.name().to_string();

            effects.ordinary(
                EventCategory::WaterStatus,
                format!(
                    "{name} water level decreased by {reduction}%. Current water level: {}%",
                    level.min(100)
                ),
            );
            if level < rules::AUTO_WATER_THRESHOLD {
                self.arm(CellTask::Watering, cell, effects);
            }
            if let Some((impact, health)) = stress {
                effects.ordinary(
                    EventCategory::WaterStress,
                    format!(
                        "{name} is showing signs of water stress! Health decreased by {impact}%. \
                         Current health: {health}%"
                    ),
                );
                self.handle_death(cell, effects);
            }
        }
    }

    fn advance_day(&mut self, effects: &mut Effects) {
        let report_due = self.clock.advance_day();
        effects.ordinary(
            EventCategory::Day,
            format!("Day {} begins", self.clock.day()),
        );
        for (_, plant) in self.garden.plants() {
            effects.ordinary(
                EventCategory::Day,
                format!("{} {}", plant.name(), plant.plant_type().growth_message()),
            );
        }
        if report_due {
            self.publish_report(effects);
        }
    }

    fn random_attack(&mut self, effects: &mut Effects) {
        let mut cells = self.garden.occupied_cells();
        if cells.is_empty() {
            debug!("Insect attack skipped: garden is empty");
            return;
        }
        let Some(insect) = self.rng.choice(Insect::all().iter().copied()) else {
            return;
        };
        self.rng.shuffle(&mut cells);
        let count = self.rng.usize(1..=cells.len());
        cells.truncate(count);
        cells.sort_unstable();

        debug!(%insect, targets = cells.len(), "Random insect attack");
        for cell in cells {
            self.attack_cell(cell, insect, effects);
        }
        effects.direct(Directive::PestControlAfter {
            delay: PEST_CONTROL_DELAY,
        });
    }

    fn automatic_pest_control(&mut self, effects: &mut Effects) {
        let agents = Insect::all();
        let actions =
            PestControlResolver::resolve(&mut self.garden, agents, PestControlOrigin::Automatic);
        self.record_pest_control(&actions, PestControlOrigin::Automatic, effects);
    }

    fn auto_water(&mut self, cell: Cell, generation: u64, effects: &mut Effects) {
        if !self.is_current(CellTask::Watering, cell, generation) {
            trace!(%cell, generation, "Ignoring stale auto-watering");
            return;
        }
        let Some(plant) = self.garden.plant_at(cell) else {
            return;
        };
        let amount = rules::auto_water_amount(
            plant.raw_water_level(),
            plant.health(),
            self.clock.temperature(),
        );
        if amount > 0 {
            self.apply_water(cell, amount, WaterSource::Automatic, effects);
        }
    }

    fn recover(&mut self, cell: Cell, generation: u64, effects: &mut Effects) {
        if !self.is_current(CellTask::Recovery, cell, generation) {
            trace!(%cell, generation, "Ignoring stale recovery");
            return;
        }
        let temperature = self.clock.temperature();
        let Some(plant) = self.garden.plant_at_mut(cell) else {
            return;
        };
        if plant.health() < MAX_HEALTH {
            let amount =
                rules::recovery_amount(plant.health(), plant.raw_water_level(), temperature);
            plant.increase_health(amount);
            effects.ordinary(
                EventCategory::Recovery,
                format!(
                    "{} recovered {amount}% health. Current health: {}%",
                    plant.name(),
                    plant.health()
                ),
            );
        }
        if plant.health() >= MAX_HEALTH {
            self.disarm(CellTask::Recovery, cell, effects);
        }
    }

    fn clear_flag(&mut self, cell: Cell, flag: CellFlag, plant: PlantId, effects: &mut Effects) {
        if self.garden.plant_at(cell).map(PlantModel::id) != Some(plant) {
            trace!(%cell, ?flag, "Ignoring stale flag clear");
            return;
        }
        self.garden.set_flag(cell, flag, false);
        if flag == CellFlag::PestControl {
            effects.ordinary(
                EventCategory::PestControl,
                format!("Pest control complete at {cell}"),
            );
        }
    }

    // === Commands ===

    /// Plants a new plant.
    pub fn plant(
        &mut self,
        cell: Cell,
        plant_type: Option<PlantType>,
        effects: &mut Effects,
    ) -> GardenResult<PlantId> {
        match self.garden.plant(cell, plant_type) {
            Ok(plant) => {
                let id = plant.id();
                effects.ordinary(
                    EventCategory::Planting,
                    format!("Planted {} at {cell}", plant.name()),
                );
                Ok(id)
            },
            Err(err) => {
                effects.ordinary(EventCategory::Rejected, format!("Cannot plant: {err}"));
                Err(err)
            },
        }
    }

    /// Removes the plant at `cell`, stopping its periodic tasks.
    pub fn remove_plant(&mut self, cell: Cell, effects: &mut Effects) -> GardenResult<PlantModel> {
        let size = self.garden.size();
        if !size.contains(cell) {
            return Err(GardenError::OutOfBounds { cell, size });
        }
        let removed = self
            .garden
            .remove(cell)
            .ok_or(GardenError::EmptyCell { cell })?;
        self.disarm_cell(cell, effects);
        effects.ordinary(
            EventCategory::Removal,
            format!("Removed {} from {cell}", removed.name()),
        );
        Ok(removed)
    }

    /// Waters every plant by `amount`. Returns the number of plants watered.
    pub fn add_water(&mut self, amount: u32, effects: &mut Effects) -> usize {
        self.garden.totals_mut().water_applied += u64::from(amount);
        self.garden
            .occupied_cells()
            .into_iter()
            .filter(|cell| self.apply_water(*cell, amount, WaterSource::Manual, effects))
            .count()
    }

    /// Sets the ambient temperature.
    pub fn set_temperature(&mut self, temperature: i32, effects: &mut Effects) {
        self.clock.set_temperature(temperature);
        effects.ordinary(
            EventCategory::Temperature,
            format!("Temperature set to {temperature}°C"),
        );
    }

    /// Attacks every susceptible plant with every selected insect.
    ///
    /// Returns the total damage dealt. No automatic pest control follows.
    pub fn trigger_insect_attack(&mut self, insects: &[Insect], effects: &mut Effects) -> u32 {
        if insects.is_empty() {
            warn!("Insect attack requested with no insects selected");
            return 0;
        }
        let mut total = 0;
        for &insect in insects {
            for cell in self.garden.occupied_cells() {
                total += self.attack_cell(cell, insect, effects);
            }
        }
        total
    }

    /// Applies the selected pest-control agents to every infested cell.
    pub fn apply_pest_control(
        &mut self,
        agents: &[Insect],
        effects: &mut Effects,
    ) -> Vec<PestControlAction> {
        if agents.is_empty() {
            effects.ordinary(
                EventCategory::Rejected,
                "Pest control needs at least one agent",
            );
        }
        let actions =
            PestControlResolver::resolve(&mut self.garden, agents, PestControlOrigin::Manual);
        self.record_pest_control(&actions, PestControlOrigin::Manual, effects);
        actions
    }

    /// Details of every live plant, keyed by plant name.
    #[must_use]
    pub fn plant_details(&self) -> BTreeMap<String, PlantDetails> {
        let catalog = self.garden.catalog();
        self.garden
            .plants()
            .map(|(cell, plant)| {
                let details = PlantDetails {
                    id: plant.id(),
                    name: plant.name().to_string(),
                    plant_type: plant.plant_type(),
                    health: plant.health(),
                    water_level: plant.water_level(),
                    water_requirement: plant.water_requirement(),
                    vulnerabilities: catalog.vulnerabilities(plant.plant_type()),
                    active_insects: self.garden.insects_at(cell).to_vec(),
                    cell,
                    watering: self.garden.flag(cell, CellFlag::Watering),
                    pest_control: self.garden.flag(cell, CellFlag::PestControl),
                    traits: plant.traits().clone(),
                    care_instructions: plant.traits().care_instructions(),
                };
                (details.name.clone(), details)
            })
            .collect()
    }

    /// Compiles a report of the current garden.
    #[must_use]
    pub fn report(&self) -> GardenReport {
        GardenReport::compile(&self.garden, &self.clock)
    }

    /// Emits the current report and any alert it raises.
    pub fn publish_report(&self, effects: &mut Effects) {
        let report = self.report();
        effects.important(EventCategory::Report, report.to_string());
        if let Some(alert) = report.alert() {
            effects.alert(alert);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Severity;

    fn seeded() -> Engine {
        Engine::new(&SimConfig {
            seed: Some(7),
            ..SimConfig::default()
        })
    }

    fn planted(cell: Cell, plant_type: PlantType) -> Engine {
        let mut engine = seeded();
        engine
            .plant(cell, Some(plant_type), &mut Effects::new())
            .expect("plant");
        engine
    }

    fn health(engine: &Engine, cell: Cell) -> Option<u32> {
        engine.garden().plant_at(cell).map(PlantModel::health)
    }

    fn arms(effects: &Effects, task: CellTask) -> Vec<(Cell, u64)> {
        effects
            .directives
            .iter()
            .filter_map(|d| match *d {
                Directive::Arm {
                    task: t,
                    cell,
                    generation,
                } if t == task => Some((cell, generation)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_water_decay_in_heat_arms_watering() {
        let cell = Cell::new(0, 0);
        let mut engine = planted(cell, PlantType::Apple);
        engine.set_temperature(40, &mut Effects::new());

        let effects = engine.apply(Intent::WaterDecay);
        let plant = engine.garden().plant_at(cell).expect("plant");
        assert_eq!(plant.water_level(), 48);
        assert_eq!(arms(&effects, CellTask::Watering).len(), 1);
        assert!(engine.is_armed(CellTask::Watering, cell));
        assert_eq!(engine.clock().ticks(), 1);
    }

    #[test]
    fn test_drought_damage_during_decay() {
        let cell = Cell::new(0, 0);
        let mut engine = planted(cell, PlantType::Bamboo);
        if let Some(plant) = engine.garden_mut().plant_at_mut(cell) {
            plant.decrease_water_level(35);
        }
        // 25 - 5 = 20, impact 3 at 25°C
        let effects = engine.apply(Intent::WaterDecay);
        assert_eq!(health(&engine, cell), Some(97));
        assert!(effects
            .events
            .iter()
            .any(|e| e.category == EventCategory::WaterStress));
    }

    #[test]
    fn test_overwatering_example() {
        let cell = Cell::new(1, 1);
        let mut engine = planted(cell, PlantType::Cherry);
        if let Some(plant) = engine.garden_mut().plant_at_mut(cell) {
            plant.water(10);
        }

        let mut effects = Effects::new();
        assert_eq!(engine.add_water(20, &mut effects), 1);
        assert_eq!(health(&engine, cell), Some(95));
        let warning = effects
            .events
            .iter()
            .find(|e| e.category == EventCategory::Overwatering)
            .expect("overwatering warning");
        assert!(warning.message.contains("Health decreased by 5%"));
        assert!(engine.garden().flag(cell, CellFlag::Watering));
        assert_eq!(engine.garden().totals().water_applied, 20);
    }

    #[test]
    fn test_water_applied_counts_once_per_command() {
        let mut engine = planted(Cell::new(0, 0), PlantType::Apple);
        engine
            .plant(Cell::new(0, 1), Some(PlantType::Bamboo), &mut Effects::new())
            .expect("plant");
        assert_eq!(engine.add_water(10, &mut Effects::new()), 2);
        assert_eq!(engine.garden().totals().water_applied, 10);
    }

    #[test]
    fn test_rearming_watering_ignores_stale_generation() {
        let cell = Cell::new(2, 3);
        let mut engine = planted(cell, PlantType::Apple);
        if let Some(plant) = engine.garden_mut().plant_at_mut(cell) {
            plant.decrease_water_level(20);
        }
        let mut effects = Effects::new();
        let old = engine.arm(CellTask::Watering, cell, &mut effects);
        let new = engine.arm(CellTask::Watering, cell, &mut effects);
        assert_ne!(old, new);

        engine.apply(Intent::AutoWater {
            cell,
            generation: old,
        });
        assert_eq!(
            engine.garden().plant_at(cell).map(PlantModel::water_level),
            Some(40)
        );

        let effects = engine.apply(Intent::AutoWater {
            cell,
            generation: new,
        });
        // (75 - 40) capped at 25
        assert_eq!(
            engine.garden().plant_at(cell).map(PlantModel::water_level),
            Some(65)
        );
        assert_eq!(effects.events[0].category, EventCategory::AutoWatering);
    }

    #[test]
    fn test_auto_water_noop_above_threshold() {
        let cell = Cell::new(0, 0);
        let mut engine = planted(cell, PlantType::Apple);
        let generation = engine.arm(CellTask::Watering, cell, &mut Effects::new());
        let effects = engine.apply(Intent::AutoWater { cell, generation });
        assert!(effects.is_empty());
        assert!(engine.is_armed(CellTask::Watering, cell));
    }

    #[test]
    fn test_death_removes_plant_and_disarms_tasks() {
        let cell = Cell::new(3, 3);
        let mut engine = planted(cell, PlantType::Lavender);
        let mut effects = Effects::new();
        engine.arm(CellTask::Watering, cell, &mut effects);
        engine.arm(CellTask::Recovery, cell, &mut effects);

        let mut effects = Effects::new();
        for _ in 0..5 {
            engine.trigger_insect_attack(&[Insect::Ladybug], &mut effects);
        }
        assert!(!engine.garden().is_occupied(cell));
        assert!(!engine.is_armed(CellTask::Watering, cell));
        assert!(!engine.is_armed(CellTask::Recovery, cell));
        assert!(effects
            .directives
            .contains(&Directive::Disarm {
                task: CellTask::Recovery,
                cell
            }));
        let death = effects
            .events
            .iter()
            .find(|e| e.category == EventCategory::Death)
            .expect("death event");
        assert_eq!(death.severity, Severity::Important);
        assert_eq!(engine.garden().totals().died, 1);
    }

    #[test]
    fn test_overwatering_kills_and_disarms() {
        let cell = Cell::new(2, 5);
        let mut engine = planted(cell, PlantType::Apple);
        engine.arm(CellTask::Recovery, cell, &mut Effects::new());

        // 60 + 240 = 300 → 110 damage
        let mut effects = Effects::new();
        assert_eq!(engine.add_water(240, &mut effects), 1);
        assert!(!engine.garden().is_occupied(cell));
        assert!(!engine.is_armed(CellTask::Recovery, cell));
        assert!(effects.directives.contains(&Directive::Disarm {
            task: CellTask::Recovery,
            cell
        }));
        assert!(effects
            .events
            .iter()
            .any(|e| e.category == EventCategory::Death && e.is_important()));
        assert_eq!(engine.garden().totals().died, 1);
    }

    #[test]
    fn test_drought_kills_plant() {
        let cell = Cell::new(6, 1);
        let mut engine = planted(cell, PlantType::Sunflower);
        engine.set_temperature(40, &mut Effects::new());

        let mut died_during_decay = false;
        for _ in 0..60 {
            let effects = engine.apply(Intent::WaterDecay);
            if effects
                .events
                .iter()
                .any(|e| e.category == EventCategory::Death)
            {
                died_during_decay = true;
                assert!(!engine.garden().is_occupied(cell));
                break;
            }
            assert!(engine.garden().is_occupied(cell));
        }
        assert!(died_during_decay);
        assert!(!engine.is_armed(CellTask::Watering, cell));
        assert_eq!(engine.garden().totals().died, 1);
        assert!(engine.plant_details().is_empty());
    }

    #[test]
    fn test_severe_attack_routing() {
        let cell = Cell::new(0, 0);
        let mut engine = planted(cell, PlantType::Lavender);
        let mut effects = Effects::new();
        // 20 damage is above the severe threshold
        engine.trigger_insect_attack(&[Insect::Ladybug], &mut effects);
        assert_eq!(effects.events[0].severity, Severity::Important);

        let cell = Cell::new(0, 1);
        engine
            .plant(cell, Some(PlantType::Apple), &mut Effects::new())
            .expect("plant");
        let mut effects = Effects::new();
        engine.trigger_insect_attack(&[Insect::Ant], &mut effects);
        assert_eq!(effects.events.len(), 1);
        assert_eq!(effects.events[0].severity, Severity::Ordinary);
        assert!(effects.directives.is_empty());
    }

    #[test]
    fn test_pest_control_example() {
        let cell = Cell::new(4, 4);
        let mut engine = planted(cell, PlantType::Cherry);
        engine.trigger_insect_attack(&[Insect::Aphid, Insect::Grasshopper], &mut Effects::new());

        let mut effects = Effects::new();
        let actions = engine.apply_pest_control(&[Insect::Aphid], &mut effects);
        assert_eq!(actions.len(), 1);
        assert_eq!(engine.garden().insects_at(cell), &[Insect::Grasshopper]);
        assert!(engine.garden().flag(cell, CellFlag::PestControl));
        assert_eq!(arms(&effects, CellTask::Recovery).len(), 1);
        assert!(effects.directives.iter().any(|d| matches!(
            d,
            Directive::ClearFlagAfter {
                flag: CellFlag::PestControl,
                ..
            }
        )));
        assert_eq!(engine.garden().totals().pest_controls_applied, 1);
    }

    #[test]
    fn test_pest_control_event_names_removed_insects() {
        let cell = Cell::new(4, 4);
        let mut engine = planted(cell, PlantType::Cherry);
        engine.trigger_insect_attack(&[Insect::Aphid, Insect::Grasshopper], &mut Effects::new());

        let mut effects = Effects::new();
        engine.apply_pest_control(&[Insect::Aphid, Insect::Grasshopper], &mut effects);
        assert_eq!(
            effects.messages(),
            vec!["Pest control removed Aphid, Grasshopper from Cherry 36 at (4, 4)"]
        );
    }

    #[test]
    fn test_recovery_disarms_at_full_health() {
        let cell = Cell::new(0, 0);
        let mut engine = planted(cell, PlantType::Apple);
        if let Some(plant) = engine.garden_mut().plant_at_mut(cell) {
            plant.decrease_health(2);
        }
        let generation = engine.arm(CellTask::Recovery, cell, &mut Effects::new());

        let effects = engine.apply(Intent::Recover { cell, generation });
        assert_eq!(health(&engine, cell), Some(100));
        assert!(!engine.is_armed(CellTask::Recovery, cell));
        assert!(effects.directives.contains(&Directive::Disarm {
            task: CellTask::Recovery,
            cell
        }));
    }

    #[test]
    fn test_recovery_amount_applied() {
        let cell = Cell::new(0, 0);
        let mut engine = planted(cell, PlantType::Apple);
        if let Some(plant) = engine.garden_mut().plant_at_mut(cell) {
            plant.decrease_health(75);
            plant.water(5);
        }
        let generation = engine.arm(CellTask::Recovery, cell, &mut Effects::new());
        engine.apply(Intent::Recover { cell, generation });
        assert_eq!(health(&engine, cell), Some(35));
        assert!(engine.is_armed(CellTask::Recovery, cell));
    }

    #[test]
    fn test_flag_clear_is_stale_after_replant() {
        let cell = Cell::new(5, 5);
        let mut engine = planted(cell, PlantType::Apple);
        engine.add_water(5, &mut Effects::new());
        let old_id = engine.garden().plant_at(cell).map(PlantModel::id).expect("plant");

        engine.remove_plant(cell, &mut Effects::new()).expect("remove");
        engine
            .plant(cell, Some(PlantType::Apple), &mut Effects::new())
            .expect("plant");
        engine.add_water(5, &mut Effects::new());

        engine.apply(Intent::ClearFlag {
            cell,
            flag: CellFlag::Watering,
            plant: old_id,
        });
        assert!(engine.garden().flag(cell, CellFlag::Watering));
    }

    #[test]
    fn test_random_attack_on_empty_garden() {
        let mut engine = seeded();
        let effects = engine.apply(Intent::InsectAttack);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_random_attack_schedules_pest_control() {
        let mut engine = seeded();
        for col in 0..4 {
            engine
                .plant(Cell::new(0, col), Some(PlantType::Sunflower), &mut Effects::new())
                .expect("plant");
        }
        let effects = engine.apply(Intent::InsectAttack);
        assert_eq!(
            effects.directives.last(),
            Some(&Directive::PestControlAfter {
                delay: PEST_CONTROL_DELAY
            })
        );
    }

    #[test]
    fn test_automatic_pest_control_clears_everything() {
        let cell = Cell::new(1, 2);
        let mut engine = planted(cell, PlantType::Cherry);
        engine.trigger_insect_attack(&[Insect::Aphid, Insect::Grasshopper], &mut Effects::new());

        let effects = engine.apply(Intent::AutoPestControl);
        assert!(engine.garden().insects_at(cell).is_empty());
        assert_eq!(arms(&effects, CellTask::Recovery).len(), 1);
        assert_eq!(engine.garden().totals().pest_controls_applied, 0);
    }

    #[test]
    fn test_report_every_24_days_with_alert() {
        let cell = Cell::new(0, 0);
        let mut engine = planted(cell, PlantType::Lavender);
        engine.trigger_insect_attack(&[Insect::Ladybug; 3], &mut Effects::new());

        let mut reports = 0;
        let mut alerts = 0;
        for _ in 0..24 {
            let effects = engine.apply(Intent::AdvanceDay);
            reports += effects
                .events
                .iter()
                .filter(|e| e.category == EventCategory::Report && e.is_important())
                .count();
            alerts += effects.alerts.len();
        }
        assert_eq!(reports, 1);
        assert_eq!(alerts, 1);
        assert_eq!(engine.clock().day(), 25);
    }

    #[test]
    fn test_day_advance_reports_growth() {
        let mut engine = planted(Cell::new(0, 2), PlantType::Bamboo);
        let effects = engine.apply(Intent::AdvanceDay);
        assert!(effects
            .messages()
            .contains(&"Bamboo 2 is shooting upwards"));
        assert_eq!(engine.clock().day(), 2);
    }

    #[test]
    fn test_remove_errors() {
        let mut engine = seeded();
        let cell = Cell::new(0, 0);
        assert_eq!(
            engine.remove_plant(cell, &mut Effects::new()).expect_err("empty"),
            GardenError::EmptyCell { cell }
        );
        assert!(matches!(
            engine.remove_plant(Cell::new(20, 0), &mut Effects::new()),
            Err(GardenError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_plant_details() {
        let cell = Cell::new(1, 4);
        let mut engine = planted(cell, PlantType::Apple);
        engine.trigger_insect_attack(&[Insect::Ant], &mut Effects::new());

        let details = engine.plant_details();
        let apple = details.get("Apple 12").expect("details");
        assert_eq!(apple.cell, cell);
        assert_eq!(apple.health, 92);
        assert_eq!(apple.vulnerabilities, vec![Insect::Aphid, Insect::Ant]);
        assert_eq!(apple.active_insects, vec![Insect::Ant]);
        assert_eq!(
            apple.care_instructions,
            "Regular watering, pruning, pest monitoring, and sufficient sunlight."
        );
    }
}
