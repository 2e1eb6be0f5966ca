//! Simulation parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use verdant_common::{GridSize, DEFAULT_COLS, DEFAULT_ROWS};

use crate::clock::DEFAULT_TEMPERATURE;
use crate::events::DEFAULT_EVENT_CAPACITY;

/// Default grace period for draining intents on shutdown.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 800;

/// Parameters for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid rows
    pub rows: u16,
    /// Grid columns
    pub cols: u16,
    /// Ambient temperature at start (°C)
    pub initial_temperature: i32,
    /// Sim-seconds per real second
    pub time_scale: f64,
    /// RNG seed (None = random)
    pub seed: Option<u64>,
    /// Shutdown grace period in real milliseconds
    pub shutdown_grace_ms: u64,
    /// Events kept by the in-memory event log
    pub event_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            initial_temperature: DEFAULT_TEMPERATURE,
            time_scale: 1.0,
            seed: None,
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SimConfig {
    /// Grid dimensions.
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.rows.max(1), self.cols.max(1))
    }

    /// Shutdown grace period.
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Time scale, falling back to 1.0 when not finite and positive.
    #[must_use]
    pub fn effective_time_scale(&self) -> f64 {
        if self.time_scale.is_finite() && self.time_scale > 0.0 {
            self.time_scale
        } else {
            1.0
        }
    }

    /// Converts a sim-time duration to real time.
    #[must_use]
    pub fn to_real(&self, sim: Duration) -> Duration {
        sim.div_f64(self.effective_time_scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.grid_size(), GridSize::new(8, 8));
        assert_eq!(config.shutdown_grace(), Duration::from_millis(800));
        assert_eq!(config.initial_temperature, 25);
    }

    #[test]
    fn test_time_scaling() {
        let config = SimConfig {
            time_scale: 60.0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.to_real(Duration::from_secs(30)),
            Duration::from_millis(500)
        );

        let broken = SimConfig {
            time_scale: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(broken.to_real(Duration::from_secs(3)), Duration::from_secs(3));
    }
}
