//! Core types for the intersection simulation
//!
//! Directions, turn geometry and light states shared by every other module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// One of the four approaches to the intersection.
///
/// The declaration order is the clockwise cycle N -> E -> S -> W used both for
/// signal rotation and for turn classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in clockwise (and enum) order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index % 4]
    }

    /// Next direction clockwise
    pub fn clockwise(self) -> Direction {
        Self::from_index(self.index() + 1)
    }

    /// The approach facing this one across the intersection
    pub fn opposite(self) -> Direction {
        Self::from_index(self.index() + 2)
    }

    /// Both members of the axis this direction belongs to, primary first
    pub fn axis(self) -> [Direction; 2] {
        match self {
            Direction::North | Direction::South => [Direction::North, Direction::South],
            Direction::East | Direction::West => [Direction::East, Direction::West],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" => Ok(Direction::North),
            "east" => Ok(Direction::East),
            "south" => Ok(Direction::South),
            "west" => Ok(Direction::West),
            _ => Err(SimulationError::UnknownDirection(s.to_string())),
        }
    }
}

/// Movement a vehicle makes through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnType {
    Left,
    Straight,
    Right,
}

impl TurnType {
    /// Classify the movement from `from` to `to`.
    ///
    /// Returns `None` when both are the same approach, since a vehicle cannot
    /// leave by the road it entered on.
    pub fn between(from: Direction, to: Direction) -> Option<TurnType> {
        match (to.index() + 4 - from.index()) % 4 {
            1 => Some(TurnType::Left),
            2 => Some(TurnType::Straight),
            3 => Some(TurnType::Right),
            _ => None,
        }
    }
}

/// State shown by a single traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightState {
    #[default]
    Red,
    /// Pre-green warning, held for one phase before GREEN is granted
    RedYellow,
    Green,
    Yellow,
}

impl LightState {
    /// Single character used by the console summary
    pub fn symbol(self) -> char {
        match self {
            LightState::Red => 'R',
            LightState::RedYellow => 'r',
            LightState::Green => 'G',
            LightState::Yellow => 'Y',
        }
    }
}

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(value: &str) -> Self {
        VehicleId(value.to_string())
    }
}

impl From<String> for VehicleId {
    fn from(value: String) -> Self {
        VehicleId(value)
    }
}
