//! Integration tests for the threaded simulation.
//!
//! Exercises: Simulation handle → mailbox → worker → engine → sinks,
//! and the timer threads feeding the same mailbox.

use std::thread;
use std::time::{Duration, Instant};

use verdant_sim::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

/// Real-time speed: no timer fires during a short test.
fn idle_config() -> SimConfig {
    SimConfig {
        seed: Some(42),
        ..SimConfig::default()
    }
}

/// 1000x speed: water decay every 30 ms.
fn fast_config() -> SimConfig {
    SimConfig {
        time_scale: 1000.0,
        seed: Some(42),
        shutdown_grace_ms: 200,
        ..SimConfig::default()
    }
}

fn start(config: SimConfig) -> (Simulation, EventLog) {
    let log = EventLog::new(config.event_capacity);
    let sinks = Sinks::new()
        .with_event_sink(log.clone())
        .with_alert_sink(log.clone());
    let simulation = Simulation::start(config, sinks).expect("worker starts");
    (simulation, log)
}

fn wait_for<F>(log: &EventLog, timeout: Duration, predicate: F) -> bool
where
    F: Fn(&GardenEvent) -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !log.find(&predicate).is_empty() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

// ── Command surface ────────────────────────────────────────────────────

#[test]
fn commands_are_applied_in_order() {
    let (simulation, log) = start(idle_config());
    let cell = Cell::new(0, 3);

    simulation
        .plant(cell, Some(PlantType::Cherry))
        .expect("plant");
    assert_eq!(
        simulation.plant(cell, Some(PlantType::Apple)),
        Err(GardenError::CellOccupied { cell })
    );
    assert_eq!(
        simulation.plant(Cell::new(1, 1), None),
        Err(GardenError::NoTypeSelected)
    );

    let damage = simulation
        .trigger_insect_attack(&[Insect::Aphid, Insect::Grasshopper])
        .expect("attack");
    assert_eq!(damage, 25);

    let actions = simulation
        .apply_pest_control(&[Insect::Aphid])
        .expect("pest control");
    assert_eq!(actions.len(), 1);

    let details = simulation.plant_details().expect("details");
    let cherry = details.get("Cherry 3").expect("cherry listed");
    assert_eq!(cherry.health, 75);
    assert_eq!(cherry.active_insects, vec![Insect::Grasshopper]);
    assert!(cherry.pest_control);

    let report = simulation.report().expect("report");
    assert_eq!(report.planted, 1);
    assert_eq!(report.pest_controls_applied, 1);

    simulation.shutdown();
    assert!(log
        .find(|e| e.category == EventCategory::Planting)
        .iter()
        .any(|e| e.message.contains("Cherry 3")));
}

#[test]
fn overwatering_is_logged_through_the_sink() {
    let (simulation, log) = start(idle_config());
    let cell = Cell::new(2, 2);
    simulation
        .plant(cell, Some(PlantType::Bamboo))
        .expect("plant");

    // 60 + 30 = 90 → 5 damage
    assert_eq!(simulation.add_water(30).expect("water"), 1);
    let details = simulation.plant_details().expect("details");
    assert_eq!(details.get("Bamboo 18").map(|d| d.health), Some(95));

    simulation.shutdown();
    assert_eq!(
        log.find(|e| e.category == EventCategory::Overwatering).len(),
        1
    );
}

#[test]
fn removal_reports_empty_cell() {
    let (simulation, _log) = start(idle_config());
    let cell = Cell::new(7, 7);
    simulation
        .plant(cell, Some(PlantType::Lavender))
        .expect("plant");
    let removed = simulation.remove_plant(cell).expect("remove");
    assert_eq!(removed.name(), "Lavender 63");
    assert_eq!(
        simulation.remove_plant(cell).expect_err("already empty"),
        GardenError::EmptyCell { cell }
    );
}

// ── Timers ─────────────────────────────────────────────────────────────

#[test]
fn heat_triggers_decay_and_automatic_watering() {
    let (simulation, log) = start(fast_config());
    simulation.set_temperature(40).expect("temperature");
    for (col, plant_type) in PlantType::all().iter().enumerate() {
        let col = u16::try_from(col).expect("small index");
        simulation
            .plant(Cell::new(0, col), Some(*plant_type))
            .expect("plant");
    }

    assert!(wait_for(&log, Duration::from_secs(3), |e| {
        e.category == EventCategory::WaterStatus
    }));
    assert!(wait_for(&log, Duration::from_secs(3), |e| {
        e.category == EventCategory::AutoWatering
    }));

    let started = Instant::now();
    simulation.shutdown();
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn shutdown_stops_all_timers() {
    let (simulation, log) = start(fast_config());
    simulation
        .plant(Cell::new(3, 3), Some(PlantType::Sunflower))
        .expect("plant");
    assert!(wait_for(&log, Duration::from_secs(3), |e| {
        e.category == EventCategory::WaterStatus
    }));
    assert!(simulation.is_running());

    simulation.shutdown();
    let settled = log.len();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(log.len(), settled);
}
