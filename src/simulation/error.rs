//! Errors raised by the simulation core.

use thiserror::Error;

use super::types::Direction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("vehicle {vehicle_id} enters and leaves by {direction}; a destination must differ from its origin")]
    UTurn {
        vehicle_id: String,
        direction: Direction,
    },

    #[error("unknown direction {0:?}, expected one of north, east, south, west")]
    UnknownDirection(String),

    #[error("unknown policy {0:?}, expected one of fixed, priority, paired")]
    UnknownPolicy(String),

    #[error("unknown left turn rule {0:?}, expected opposing or yellow")]
    UnknownLeftTurnRule(String),
}
