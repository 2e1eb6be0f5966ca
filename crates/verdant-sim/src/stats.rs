//! Garden-wide statistics and the periodic performance report.
//!
//! This module provides:
//! - Running totals (planted, died, water, pest controls)
//! - Health banding of live plants
//! - The report snapshot and its alert threshold

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::clock::SimulationClock;
use crate::events::Alert;
use crate::garden::Garden;
use crate::plant::PlantType;

/// Health at or above which a plant counts as healthy.
pub const HEALTHY_THRESHOLD: u32 = 80;

/// Health at or above which a plant counts as stressed rather than dying.
pub const STRESSED_THRESHOLD: u32 = 50;

/// Average health below which the garden raises an alert.
pub const ALERT_AVERAGE_HEALTH: f64 = 50.0;

/// Running totals kept for the lifetime of a garden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsAccumulator {
    /// Plants ever planted
    pub planted: u64,
    /// Plants that died
    pub died: u64,
    /// Water units added by watering commands
    pub water_applied: u64,
    /// Manual pest-control applications
    pub pest_controls_applied: u64,
}

impl StatsAccumulator {
    /// Percentage of planted plants that have not died, 0 when nothing was planted.
    #[must_use]
    pub fn survival_rate(&self) -> f64 {
        if self.planted == 0 {
            return 0.0;
        }
        (self.planted.saturating_sub(self.died)) as f64 * 100.0 / self.planted as f64
    }
}

/// Health band of a live plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthBand {
    /// Health ≥ 80
    Healthy,
    /// Health 50-79
    Stressed,
    /// Health < 50
    Dying,
}

impl HealthBand {
    /// Classifies a health value.
    #[must_use]
    pub const fn of(health: u32) -> Self {
        if health >= HEALTHY_THRESHOLD {
            Self::Healthy
        } else if health >= STRESSED_THRESHOLD {
            Self::Stressed
        } else {
            Self::Dying
        }
    }
}

/// Aggregate over the plants of one health band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandSummary {
    /// Plants in the band
    pub count: usize,
    /// Average health of those plants
    pub average_health: f64,
    /// Average water level of those plants
    pub average_water: f64,
}

#[derive(Default)]
struct BandAccumulator {
    count: usize,
    health: u64,
    water: u64,
}

impl BandAccumulator {
    fn add(&mut self, health: u32, water: u32) {
        self.count += 1;
        self.health += u64::from(health);
        self.water += u64::from(water);
    }

    fn summary(&self) -> BandSummary {
        if self.count == 0 {
            return BandSummary::default();
        }
        BandSummary {
            count: self.count,
            average_health: self.health as f64 / self.count as f64,
            average_water: self.water as f64 / self.count as f64,
        }
    }
}

/// Snapshot of garden statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenReport {
    /// Days elapsed when the report was compiled
    pub day: u32,
    /// Live plants
    pub plant_count: usize,
    /// Plants ever planted
    pub planted: u64,
    /// Plants that died
    pub died: u64,
    /// Survival percentage
    pub survival_rate: f64,
    /// Plants with health ≥ 80
    pub healthy: BandSummary,
    /// Plants with health 50-79
    pub stressed: BandSummary,
    /// Plants with health < 50
    pub dying: BandSummary,
    /// Average health over all live plants (0 when empty)
    pub average_health: f64,
    /// Average water level over all live plants (0 when empty)
    pub average_water: f64,
    /// Water units added by watering commands
    pub water_applied: u64,
    /// Manual pest-control applications
    pub pest_controls_applied: u64,
    /// Live plants per type
    pub population: BTreeMap<PlantType, usize>,
    /// Ambient temperature (°C)
    pub temperature: i32,
}

impl GardenReport {
    /// Builds a report from the live garden and its counters.
    #[must_use]
    pub fn compile(garden: &Garden, clock: &SimulationClock) -> Self {
        let mut bands: [BandAccumulator; 3] = Default::default();
        let mut all = BandAccumulator::default();
        let mut population = BTreeMap::new();

        for (_, plant) in garden.plants() {
            let (health, water) = (plant.health(), plant.water_level());
            let slot = match HealthBand::of(health) {
                HealthBand::Healthy => 0,
                HealthBand::Stressed => 1,
                HealthBand::Dying => 2,
            };
            bands[slot].add(health, water);
            all.add(health, water);
            *population.entry(plant.plant_type()).or_insert(0) += 1;
        }

        let totals = garden.totals();
        let overall = all.summary();
        Self {
            day: clock.days_elapsed(),
            plant_count: all.count,
            planted: totals.planted,
            died: totals.died,
            survival_rate: totals.survival_rate(),
            healthy: bands[0].summary(),
            stressed: bands[1].summary(),
            dying: bands[2].summary(),
            average_health: overall.average_health,
            average_water: overall.average_water,
            water_applied: totals.water_applied,
            pest_controls_applied: totals.pest_controls_applied,
            population,
            temperature: clock.temperature(),
        }
    }

    /// Alert raised when any plant is dying or average health is below 50.
    #[must_use]
    pub fn alert(&self) -> Option<Alert> {
        if self.dying.count == 0 && self.average_health >= ALERT_AVERAGE_HEALTH {
            return None;
        }
        Some(Alert::new(
            "⚠️ Critical Garden Status",
            format!(
                "Warning: Your garden is showing signs of stress!\n\
                 - {} plants are dying\n\
                 - Average health is {:.1}%\n\
                 Please take immediate action to improve conditions.",
                self.dying.count, self.average_health
            ),
        ))
    }
}

impl fmt::Display for GardenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "==========================================";
        writeln!(f, "📊 SYSTEM PERFORMANCE REPORT (Day {})", self.day)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Current Plant Count: {}", self.plant_count)?;
        writeln!(f, "Total Plants Planted: {}", self.planted)?;
        writeln!(f, "Total Plants Died: {}", self.died)?;
        writeln!(f, "Survival Rate: {:.2}%", self.survival_rate)?;
        writeln!(f)?;
        writeln!(f, "Health Status:")?;
        for (label, band) in [
            ("Healthy Plants (>=80%)", &self.healthy),
            ("Stressed Plants (50-79%)", &self.stressed),
            ("Dying Plants (<50%)", &self.dying),
        ] {
            writeln!(
                f,
                "- {label}: {} (avg health {:.1}%, avg water {:.1}%)",
                band.count, band.average_health, band.average_water
            )?;
        }
        writeln!(f, "- Average Health: {:.1}%", self.average_health)?;
        writeln!(f)?;
        writeln!(f, "Water Status:")?;
        writeln!(f, "- Average Water Level: {:.1}%", self.average_water)?;
        writeln!(f, "- Total Water Added: {} units", self.water_applied)?;
        writeln!(f)?;
        writeln!(f, "Pest Control:")?;
        writeln!(
            f,
            "- Total Pest Controls Applied: {}",
            self.pest_controls_applied
        )?;
        writeln!(f)?;
        writeln!(f, "Plant Distribution:")?;
        for (plant_type, count) in &self.population {
            writeln!(f, "- {plant_type}: {count}")?;
        }
        writeln!(f)?;
        writeln!(f, "Environmental Conditions:")?;
        writeln!(f, "- Current Temperature: {}°C", self.temperature)?;
        write!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_common::Cell;

    use crate::insects::Insect;

    #[test]
    fn test_survival_rate() {
        let totals = StatsAccumulator {
            planted: 10,
            died: 3,
            ..Default::default()
        };
        assert!((totals.survival_rate() - 70.0).abs() < f64::EPSILON);
        assert!(StatsAccumulator::default().survival_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_survival_rate_formatting() {
        let mut garden = Garden::default();
        garden.totals_mut().planted = 10;
        garden.totals_mut().died = 3;
        let report = GardenReport::compile(&garden, &SimulationClock::default());
        assert!(report.to_string().contains("Survival Rate: 70.00%"));
    }

    #[test]
    fn test_health_bands() {
        assert_eq!(HealthBand::of(100), HealthBand::Healthy);
        assert_eq!(HealthBand::of(80), HealthBand::Healthy);
        assert_eq!(HealthBand::of(79), HealthBand::Stressed);
        assert_eq!(HealthBand::of(50), HealthBand::Stressed);
        assert_eq!(HealthBand::of(49), HealthBand::Dying);
    }

    #[test]
    fn test_report_aggregates_live_plants() {
        let mut garden = Garden::default();
        let apple = Cell::new(0, 0);
        let lavender = Cell::new(0, 1);
        garden.plant(apple, Some(PlantType::Apple)).expect("plant");
        garden
            .plant(lavender, Some(PlantType::Lavender))
            .expect("plant");
        garden
            .plant(Cell::new(0, 2), Some(PlantType::Apple))
            .expect("plant");
        // 100 - 3 * 20 = 40
        for _ in 0..3 {
            garden.apply_insect_damage(lavender, Insect::Ladybug);
        }

        let report = GardenReport::compile(&garden, &SimulationClock::default());
        assert_eq!(report.plant_count, 3);
        assert_eq!(report.healthy.count, 2);
        assert_eq!(report.dying.count, 1);
        assert!((report.dying.average_health - 40.0).abs() < f64::EPSILON);
        assert!((report.average_health - 80.0).abs() < f64::EPSILON);
        assert_eq!(report.population.get(&PlantType::Apple), Some(&2));
        assert_eq!(report.population.get(&PlantType::Lavender), Some(&1));

        let alert = report.alert().expect("dying plant triggers alert");
        assert!(alert.body.contains("1 plants are dying"));
    }

    #[test]
    fn test_no_alert_for_healthy_garden() {
        let mut garden = Garden::default();
        garden
            .plant(Cell::new(1, 1), Some(PlantType::Bamboo))
            .expect("plant");
        let report = GardenReport::compile(&garden, &SimulationClock::default());
        assert!(report.alert().is_none());
    }

    #[test]
    fn test_empty_garden_alerts_on_zero_average() {
        let report = GardenReport::compile(&Garden::default(), &SimulationClock::default());
        assert_eq!(report.plant_count, 0);
        assert!(report.alert().is_some());
    }
}
