//! Simulation clock: timer ticks, day counter and ambient temperature.

use serde::{Deserialize, Serialize};

/// Default ambient temperature in °C.
pub const DEFAULT_TEMPERATURE: i32 = 25;

/// Temperature range shown to viewers (°C).
pub const TEMPERATURE_DISPLAY_RANGE: (i32, i32) = (-50, 50);

/// Days between performance reports.
pub const REPORT_INTERVAL_DAYS: u32 = 24;

/// Counters describing simulated time and weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    ticks: u64,
    day: u32,
    days_elapsed: u32,
    temperature: i32,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE)
    }
}

impl SimulationClock {
    /// Creates a clock on day 1 at the given temperature.
    #[must_use]
    pub const fn new(temperature: i32) -> Self {
        Self {
            ticks: 0,
            day: 1,
            days_elapsed: 0,
            temperature,
        }
    }

    /// Records one applied timer intent.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Moves to the next day. Returns true when a report is due.
    pub fn advance_day(&mut self) -> bool {
        self.day = self.day.saturating_add(1);
        self.days_elapsed = self.days_elapsed.saturating_add(1);
        self.days_elapsed % REPORT_INTERVAL_DAYS == 0
    }

    /// Sets the ambient temperature.
    pub fn set_temperature(&mut self, temperature: i32) {
        self.temperature = temperature;
    }

    /// Timer intents applied so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current day number (starts at 1).
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Days elapsed since the simulation started.
    #[must_use]
    pub const fn days_elapsed(&self) -> u32 {
        self.days_elapsed
    }

    /// Ambient temperature in °C.
    #[must_use]
    pub const fn temperature(&self) -> i32 {
        self.temperature
    }

    /// Temperature clamped to the display range.
    #[must_use]
    pub fn display_temperature(&self) -> i32 {
        self.temperature
            .clamp(TEMPERATURE_DISPLAY_RANGE.0, TEMPERATURE_DISPLAY_RANGE.1)
    }
}
