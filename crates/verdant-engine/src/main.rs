//! # Verdant
//!
//! Runs the garden simulation and reads console commands from stdin.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use verdant_engine::{Console, ConsoleAction, EngineConfig, Journal, CONFIG_FILE};
use verdant_sim::{EventLog, Simulation, Sinks};

#[derive(Parser, Debug)]
#[command(name = "verdant")]
#[command(about = "Automated garden simulator", version)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Simulated seconds per real second
    #[arg(short, long)]
    time_scale: Option<f64>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run headless for this many real seconds instead of reading commands
    #[arg(short, long)]
    duration: Option<u64>,

    /// Disable the event journal
    #[arg(long)]
    no_journal: bool,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

fn init_tracing(config: &EngineConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.log_filter.parse()?);
    let (json, plain) = if config.json_logs {
        (Some(fmt::layer().json().with_writer(io::stderr)), None)
    } else {
        (None, Some(fmt::layer().with_writer(io::stderr)))
    };
    tracing_subscriber::registry()
        .with(json)
        .with(plain)
        .with(filter)
        .init();
    Ok(())
}

fn build_sinks(config: &EngineConfig, log: &EventLog) -> Sinks {
    let mut sinks = Sinks::tracing()
        .with_event_sink(log.clone())
        .with_alert_sink(log.clone());

    if config.journal_enabled {
        match Journal::open(&config.journal_path) {
            Ok(journal) => {
                info!("Journaling to {}", journal.path().display());
                sinks = sinks
                    .with_event_sink(journal.clone())
                    .with_alert_sink(journal);
            },
            Err(e) => warn!(
                "Journal disabled, cannot open {}: {e}",
                config.journal_path.display()
            ),
        }
    }
    sinks
}

fn run_console(simulation: &Simulation, console: &Console) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "Type 'help' for commands.")?;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match console.handle_line(simulation, &line) {
            Ok(Some(ConsoleAction::Print(text))) => writeln!(stdout, "{text}")?,
            Ok(Some(ConsoleAction::Quit)) => break,
            Ok(None) => {},
            Err(e) => writeln!(stdout, "error: {e}")?,
        }
        if !simulation.is_running() {
            warn!("Simulation worker stopped");
            break;
        }
    }
    Ok(())
}

/// Main entry point.
fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = EngineConfig::load_from(&args.config);
    if let Some(scale) = args.time_scale {
        config.simulation.time_scale = scale;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    if args.no_journal {
        config.journal_enabled = false;
    }
    config.validate();

    if args.write_config {
        config.save_to(&args.config)?;
        return Ok(());
    }

    init_tracing(&config)?;
    info!("Verdant starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let log = EventLog::new(config.simulation.event_capacity);
    let sinks = build_sinks(&config, &log);
    let simulation = Simulation::start(config.simulation.clone(), sinks)
        .context("failed to start simulation worker")?;

    match args.duration {
        Some(secs) => {
            info!("Running headless for {secs}s");
            thread::sleep(Duration::from_secs(secs));
        },
        None => run_console(&simulation, &Console::new(log, config.recent_events))?,
    }

    simulation.shutdown();
    info!("Verdant shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::parse_from([
            "verdant",
            "--time-scale",
            "60",
            "--seed",
            "7",
            "--no-journal",
        ]);
        assert_eq!(args.config, PathBuf::from(CONFIG_FILE));
        assert_eq!(args.seed, Some(7));
        assert!(args.no_journal);
        assert!(args.duration.is_none());
    }

    #[test]
    fn test_disabled_journal_adds_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = EngineConfig {
            journal_enabled: false,
            journal_path: dir.path().join("journal.txt"),
            ..EngineConfig::default()
        };
        drop(build_sinks(&config, &EventLog::new(16)));
        assert!(!config.journal_path.exists());
    }
}
