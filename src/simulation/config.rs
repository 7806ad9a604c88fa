//! Tunable timings and rules for the scheduling policies

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Default number of ticks a direction stays GREEN
pub const DEFAULT_GREEN_TICKS: u32 = 4;

/// Default number of ticks for YELLOW
pub const DEFAULT_YELLOW_TICKS: u32 = 1;

/// Default number of ticks for the RED_YELLOW warning before GREEN
pub const DEFAULT_RED_YELLOW_TICKS: u32 = 1;

/// Queue length at which a waiting direction jumps the rotation
pub const DEFAULT_PRIORITY_THRESHOLD: usize = 3;

/// Durations of the GREEN -> YELLOW -> RED_YELLOW cycle, in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    pub green: u32,
    pub yellow: u32,
    pub red_yellow: u32,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            green: DEFAULT_GREEN_TICKS,
            yellow: DEFAULT_YELLOW_TICKS,
            red_yellow: DEFAULT_RED_YELLOW_TICKS,
        }
    }
}

impl PhaseTimings {
    /// Ticks a direction spends from the start of GREEN to the next direction's GREEN
    pub fn cycle_length(&self) -> u32 {
        self.green + self.yellow + self.red_yellow
    }
}

/// When an unprotected left turn may go under the paired-axis policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeftTurnRule {
    /// End of phase, empty opposing queue, or an opposing left-turner at the head
    #[default]
    OpposingQueue,
    /// Only while the approach shows YELLOW
    YellowOnly,
}

impl FromStr for LeftTurnRule {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opposing" | "opposing_queue" => Ok(LeftTurnRule::OpposingQueue),
            "yellow" | "yellow_only" => Ok(LeftTurnRule::YellowOnly),
            _ => Err(SimulationError::UnknownLeftTurnRule(s.to_string())),
        }
    }
}

/// Configuration shared by every policy an intersection can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionConfig {
    pub timings: PhaseTimings,
    /// A non-active direction with at least this many waiting vehicles is
    /// picked ahead of the clockwise rotation
    pub priority_threshold: usize,
    /// Let vehicles cross on YELLOW under the single-direction policies
    pub yellow_crossing: bool,
    pub left_turn: LeftTurnRule,
    /// Trailing GREEN ticks that count as the end-of-phase left-turn window
    pub left_turn_window: u32,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            timings: PhaseTimings::default(),
            priority_threshold: DEFAULT_PRIORITY_THRESHOLD,
            yellow_crossing: true,
            left_turn: LeftTurnRule::default(),
            left_turn_window: 0,
        }
    }
}
