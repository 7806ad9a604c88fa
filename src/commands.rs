//! Command logs in, step statuses out
//!
//! Reads the JSON command document that drives a run, replays it through a
//! [`SimulationEngine`] and writes the per-step departures back out.
//!
//! Input:
//! ```json
//! {"commands": [
//!     {"type": "addVehicle", "vehicleId": "v1", "startRoad": "south", "endRoad": "north"},
//!     {"type": "step"}
//! ]}
//! ```
//!
//! Output:
//! ```json
//! {"stepStatuses": [{"leftVehicles": ["v1"]}]}
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::simulation::{Direction, PolicyKind, SimulationEngine, SimulationError, StepReport, VehicleId};

/// One instruction for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddVehicle {
        vehicle_id: VehicleId,
        origin: Direction,
        destination: Direction,
    },
    Step,
    SetPolicy(PolicyKind),
}

/// A rejected command, identified by its position in the log
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command document is not valid JSON of the form {{\"commands\": [...]}}: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command {index}: expected an object with a \"type\" field")]
    Malformed { index: usize },

    #[error("command {index}: unknown command type {kind:?}")]
    UnknownCommandType { index: usize, kind: String },

    #[error("command {index} ({kind}): missing string field \"{field}\"")]
    MissingField {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },

    #[error("command {index}: {source}")]
    UnknownDirection {
        index: usize,
        source: SimulationError,
    },

    #[error("command {index}: {source}")]
    UnknownPolicy {
        index: usize,
        source: SimulationError,
    },

    #[error("command {index}: {source}")]
    InvalidVehicle {
        index: usize,
        source: SimulationError,
    },
}

#[derive(Deserialize)]
struct CommandDocument {
    commands: Vec<Value>,
}

/// Serialized form of a command, matching the input document
#[derive(Serialize)]
#[serde(tag = "type")]
enum CommandRecord<'a> {
    #[serde(rename = "addVehicle")]
    AddVehicle {
        #[serde(rename = "vehicleId")]
        vehicle_id: &'a str,
        #[serde(rename = "startRoad")]
        start_road: Direction,
        #[serde(rename = "endRoad")]
        end_road: Direction,
    },
    #[serde(rename = "step")]
    Step,
    #[serde(rename = "setPolicy")]
    SetPolicy { policy: &'static str },
}

impl<'a> From<&'a Command> for CommandRecord<'a> {
    fn from(command: &'a Command) -> Self {
        match command {
            Command::AddVehicle {
                vehicle_id,
                origin,
                destination,
            } => CommandRecord::AddVehicle {
                vehicle_id: vehicle_id.as_str(),
                start_road: *origin,
                end_road: *destination,
            },
            Command::Step => CommandRecord::Step,
            Command::SetPolicy(kind) => CommandRecord::SetPolicy { policy: kind.name() },
        }
    }
}

#[derive(Serialize)]
struct CommandRecords<'a> {
    commands: Vec<CommandRecord<'a>>,
}

/// Output document: one entry per executed step
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepStatuses {
    #[serde(rename = "stepStatuses")]
    pub step_statuses: Vec<StepReport>,
}

fn string_field<'a>(
    object: &'a Value,
    index: usize,
    kind: &'static str,
    field: &'static str,
) -> Result<&'a str, CommandError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or(CommandError::MissingField { index, kind, field })
}

fn direction_field(
    object: &Value,
    index: usize,
    kind: &'static str,
    field: &'static str,
) -> Result<Direction, CommandError> {
    string_field(object, index, kind, field)?
        .parse()
        .map_err(|source| CommandError::UnknownDirection { index, source })
}

fn parse_command(index: usize, value: &Value) -> Result<Command, CommandError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(CommandError::Malformed { index })?;

    match kind {
        "addVehicle" => Ok(Command::AddVehicle {
            vehicle_id: string_field(value, index, "addVehicle", "vehicleId")?.into(),
            origin: direction_field(value, index, "addVehicle", "startRoad")?,
            destination: direction_field(value, index, "addVehicle", "endRoad")?,
        }),
        "step" => Ok(Command::Step),
        "setPolicy" => string_field(value, index, "setPolicy", "policy")?
            .parse()
            .map(Command::SetPolicy)
            .map_err(|source| CommandError::UnknownPolicy { index, source }),
        other => Err(CommandError::UnknownCommandType {
            index,
            kind: other.to_string(),
        }),
    }
}

/// Parse a command document, rejecting the first malformed command
pub fn parse_commands(input: &str) -> Result<Vec<Command>, CommandError> {
    let document: CommandDocument = serde_json::from_str(input)?;
    document
        .commands
        .iter()
        .enumerate()
        .map(|(index, value)| parse_command(index, value))
        .collect()
}

pub fn load_commands(path: impl AsRef<Path>) -> Result<Vec<Command>> {
    let path = path.as_ref();
    let input = fs::read_to_string(path)
        .with_context(|| format!("Failed to read command file {}", path.display()))?;
    parse_commands(&input).with_context(|| format!("Invalid command file {}", path.display()))
}

/// Feed commands to the engine in order.
///
/// With `lenient` set, vehicles the engine refuses are logged and skipped
/// instead of aborting the run.
pub fn run_commands(
    engine: &mut SimulationEngine,
    commands: &[Command],
    lenient: bool,
) -> Result<(), CommandError> {
    for (index, command) in commands.iter().enumerate() {
        match command {
            Command::AddVehicle {
                vehicle_id,
                origin,
                destination,
            } => {
                if let Err(source) = engine.add_vehicle(vehicle_id.clone(), *origin, *destination) {
                    if !lenient {
                        return Err(CommandError::InvalidVehicle { index, source });
                    }
                    warn!("Skipping command {}: {}", index, source);
                }
            }
            Command::Step => {
                engine.step();
            }
            Command::SetPolicy(kind) => {
                engine.set_policy(*kind);
            }
        }
    }
    Ok(())
}

/// Render step reports as the pretty-printed output document
pub fn render_step_reports(reports: &[StepReport]) -> Result<String> {
    let document = StepStatuses {
        step_statuses: reports.to_vec(),
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize step statuses")
}

pub fn write_step_reports(path: impl AsRef<Path>, reports: &[StepReport]) -> Result<()> {
    let path = path.as_ref();
    let output = render_step_reports(reports)?;
    fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))
}

/// Render commands as an input document
pub fn render_commands(commands: &[Command]) -> Result<String> {
    let document = CommandRecords {
        commands: commands.iter().map(CommandRecord::from).collect(),
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize commands")
}
