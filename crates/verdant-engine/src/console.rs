//! Line-oriented command console.
//!
//! This module provides:
//! - Parsing of text commands into typed console commands
//! - Execution of those commands against a running simulation
//! - Help text and recent-event listing

use std::fmt::Write as _;
use thiserror::Error;

use verdant_common::{Cell, GardenError};
use verdant_sim::{EventLog, Insect, PlantType, Simulation};

/// Errors produced while parsing or running a console command.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The first word is not a known command
    #[error("unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),
    /// A required argument is missing
    #[error("{command}: missing <{argument}>")]
    MissingArgument {
        /// Command name
        command: &'static str,
        /// Argument name
        argument: &'static str,
    },
    /// An argument is not a valid number
    #[error("{argument}: '{value}' is not a valid number")]
    InvalidNumber {
        /// Argument name
        argument: &'static str,
        /// Offending text
        value: String,
    },
    /// The simulation rejected the command
    #[error(transparent)]
    Garden(#[from] GardenError),
    /// JSON rendering failed
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Plant at a cell, optionally with a type
    Plant {
        /// Target cell
        cell: Cell,
        /// Plant type, if given
        plant_type: Option<PlantType>,
    },
    /// Remove the plant at a cell
    Remove {
        /// Target cell
        cell: Cell,
    },
    /// Water every plant
    Water {
        /// Units of water
        amount: u32,
    },
    /// Set the ambient temperature
    Temperature {
        /// Degrees Celsius
        value: i32,
    },
    /// Attack with the given insects
    Attack {
        /// Attacking insects
        insects: Vec<Insect>,
    },
    /// Apply the given pest-control agents
    PestControl {
        /// Selected agents
        agents: Vec<Insect>,
    },
    /// List plant details
    Details {
        /// Render as JSON
        json: bool,
    },
    /// Show the statistics report
    Report {
        /// Render as JSON
        json: bool,
    },
    /// Show recent events
    Log {
        /// Number of events, default when None
        count: Option<usize>,
    },
    /// Show help
    Help,
    /// Leave the console
    Quit,
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Print the text and keep reading
    Print(String),
    /// Stop reading commands
    Quit,
}

const HELP: &str = "\
Commands:
  plant <row> <col> <type>   plant Apple, Cherry, Lavender, Bamboo or Sunflower
  remove <row> <col>         remove a plant
  water <amount>             water every plant
  temp <celsius>             set the ambient temperature
  attack <insect>...         attack with Aphid, Ant, Grasshopper, Ladybug
  pest <agent>...            apply pest control against the named insects
  details [--json]           list plants
  report [--json]            show the garden report
  log [count]                show recent events
  help                       show this text
  quit                       stop the simulation";

fn number<T: std::str::FromStr>(
    parts: &mut std::str::SplitWhitespace<'_>,
    command: &'static str,
    argument: &'static str,
) -> Result<T, ConsoleError> {
    let value = parts
        .next()
        .ok_or(ConsoleError::MissingArgument { command, argument })?;
    value.parse().map_err(|_| ConsoleError::InvalidNumber {
        argument,
        value: value.to_string(),
    })
}

fn cell(
    parts: &mut std::str::SplitWhitespace<'_>,
    command: &'static str,
) -> Result<Cell, ConsoleError> {
    let row = number(parts, command, "row")?;
    let col = number(parts, command, "col")?;
    Ok(Cell::new(row, col))
}

fn insects(
    parts: std::str::SplitWhitespace<'_>,
    command: &'static str,
) -> Result<Vec<Insect>, ConsoleError> {
    let insects = parts
        .map(str::parse::<Insect>)
        .collect::<Result<Vec<_>, _>>()?;
    if insects.is_empty() {
        return Err(ConsoleError::MissingArgument {
            command,
            argument: "insect",
        });
    }
    Ok(insects)
}

/// Parses one input line. Returns `Ok(None)` for blank lines.
pub fn parse_command(input: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mut parts = input.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "plant" => {
            let cell = cell(&mut parts, "plant")?;
            let plant_type = parts.next().map(str::parse::<PlantType>).transpose()?;
            ConsoleCommand::Plant { cell, plant_type }
        },
        "remove" => ConsoleCommand::Remove {
            cell: cell(&mut parts, "remove")?,
        },
        "water" => ConsoleCommand::Water {
            amount: number(&mut parts, "water", "amount")?,
        },
        "temp" | "temperature" => ConsoleCommand::Temperature {
            value: number(&mut parts, "temp", "celsius")?,
        },
        "attack" => ConsoleCommand::Attack {
            insects: insects(parts, "attack")?,
        },
        "pest" => ConsoleCommand::PestControl {
            agents: insects(parts, "pest")?,
        },
        "details" => ConsoleCommand::Details {
            json: parts.next() == Some("--json"),
        },
        "report" => ConsoleCommand::Report {
            json: parts.next() == Some("--json"),
        },
        "log" => ConsoleCommand::Log {
            count: parts
                .next()
                .map(|v| {
                    v.parse().map_err(|_| ConsoleError::InvalidNumber {
                        argument: "count",
                        value: v.to_string(),
                    })
                })
                .transpose()?,
        },
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// Runs console commands against a simulation.
#[derive(Debug, Clone)]
pub struct Console {
    log: EventLog,
    recent_events: usize,
}

impl Console {
    /// Creates a console reading recent events from `log`.
    #[must_use]
    pub fn new(log: EventLog, recent_events: usize) -> Self {
        Self { log, recent_events }
    }

    /// Parses and runs one line.
    pub fn handle_line(
        &self,
        simulation: &Simulation,
        line: &str,
    ) -> Result<Option<ConsoleAction>, ConsoleError> {
        match parse_command(line)? {
            Some(command) => self.execute(simulation, command).map(Some),
            None => Ok(None),
        }
    }

    /// Runs one parsed command.
    pub fn execute(
        &self,
        simulation: &Simulation,
        command: ConsoleCommand,
    ) -> Result<ConsoleAction, ConsoleError> {
        let text = match command {
            ConsoleCommand::Plant { cell, plant_type } => {
                let id = simulation.plant(cell, plant_type)?;
                format!("Planted {id} at {cell}")
            },
            ConsoleCommand::Remove { cell } => {
                let removed = simulation.remove_plant(cell)?;
                format!("Removed {} from {cell}", removed.name())
            },
            ConsoleCommand::Water { amount } => {
                let watered = simulation.add_water(amount)?;
                format!("Watered {watered} plants with {amount} units each")
            },
            ConsoleCommand::Temperature { value } => {
                simulation.set_temperature(value)?;
                format!("Temperature set to {value}°C")
            },
            ConsoleCommand::Attack { insects } => {
                let damage = simulation.trigger_insect_attack(&insects)?;
                format!("Attack dealt {damage} total damage")
            },
            ConsoleCommand::PestControl { agents } => {
                let actions = simulation.apply_pest_control(&agents)?;
                format!("Pest control treated {} cells", actions.len())
            },
            ConsoleCommand::Details { json } => {
                let details = simulation.plant_details()?;
                if json {
                    serde_json::to_string_pretty(&details)?
                } else if details.is_empty() {
                    "The garden is empty".to_string()
                } else {
                    let mut out = String::new();
                    for d in details.values() {
                        let insects = d
                            .active_insects
                            .iter()
                            .map(|i| i.icon())
                            .collect::<String>();
                        let _ = writeln!(
                            out,
                            "{} {:<14} {:<9} health {:>3}%  water {:>3}%  {insects}",
                            d.plant_type.icon(),
                            d.name,
                            d.cell.to_string(),
                            d.health,
                            d.water_level,
                        );
                    }
                    out.trim_end().to_string()
                }
            },
            ConsoleCommand::Report { json } => {
                let report = simulation.report()?;
                if json {
                    serde_json::to_string_pretty(&report)?
                } else {
                    report.to_string()
                }
            },
            ConsoleCommand::Log { count } => {
                let events = self.log.recent(count.unwrap_or(self.recent_events));
                if events.is_empty() {
                    "No events yet".to_string()
                } else {
                    events
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            },
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Quit => return Ok(ConsoleAction::Quit),
        };
        Ok(ConsoleAction::Print(text))
    }
}
