//! Engine configuration.
//!
//! Provides the simulation parameters plus journal, logging and console
//! settings. Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use verdant_sim::SimConfig;

/// Configuration file name.
pub const CONFIG_FILE: &str = "verdant.toml";

/// Default journal file name.
pub const JOURNAL_FILE: &str = "garden_log.txt";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Journal Settings ===
    /// Record important events to a file
    pub journal_enabled: bool,
    /// Journal file path
    pub journal_path: PathBuf,

    // === Logging Settings ===
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,

    // === Console Settings ===
    /// Events shown by the `log` command when no count is given
    pub recent_events: usize,

    // === Simulation Settings ===
    /// Garden and timer parameters
    pub simulation: SimConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            journal_enabled: true,
            journal_path: PathBuf::from(JOURNAL_FILE),
            log_filter: "verdant=info".to_string(),
            json_logs: false,
            recent_events: 20,
            simulation: SimConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let mut contents = String::new();
        if let Err(e) = fs::File::open(path).and_then(|mut f| f.read_to_string(&mut contents)) {
            warn!("Failed to read config file: {e}");
            return Self::default();
        }

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        let sim = &mut self.simulation;
        sim.rows = sim.rows.clamp(1, 64);
        sim.cols = sim.cols.clamp(1, 64);
        if !sim.time_scale.is_finite() || sim.time_scale <= 0.0 {
            warn!("Invalid time scale {}, using 1.0", sim.time_scale);
            sim.time_scale = 1.0;
        }
        sim.time_scale = sim.time_scale.clamp(0.1, 10_000.0);
        sim.event_capacity = sim.event_capacity.max(16);
        self.recent_events = self.recent_events.clamp(1, 500);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = EngineConfig::load_from(dir.path().join("absent.toml"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "journal_enabled = false\n\n[simulation]\ntime_scale = 120.0\nseed = 9\n",
        )
        .expect("write config");

        let config = EngineConfig::load_from(&path);
        assert!(!config.journal_enabled);
        assert_eq!(config.simulation.seed, Some(9));
        assert!((config.simulation.time_scale - 120.0).abs() < f64::EPSILON);
        assert_eq!(config.simulation.rows, 8);
        assert_eq!(config.journal_path, PathBuf::from(JOURNAL_FILE));
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "simulation = [").expect("write config");
        assert_eq!(EngineConfig::load_from(&path), EngineConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut config = EngineConfig::default();
        config.simulation.initial_temperature = 31;
        config.recent_events = 50;

        config.save_to(&path).expect("save");
        assert_eq!(EngineConfig::load_from(&path), config);
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = EngineConfig::default();
        config.simulation.rows = 0;
        config.simulation.time_scale = -3.0;
        config.recent_events = 0;
        config.validate();
        assert_eq!(config.simulation.rows, 1);
        assert!((config.simulation.time_scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.recent_events, 1);
    }
}
