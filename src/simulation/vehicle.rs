//! Vehicle lifecycle for the intersection simulation
//!
//! A vehicle is a single trip request: it waits in the queue of its origin,
//! crosses in a single tick once cleared, and is then complete.

use super::error::SimulationError;
use super::types::{Direction, TurnType, VehicleId};

/// Where a vehicle is in its trip through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    Waiting,
    Crossing,
    Completed,
}

/// A vehicle in the intersection simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub origin: Direction,
    pub destination: Direction,
    state: VehicleState,
    waited_ticks: u32,
    turn: TurnType,
}

impl Vehicle {
    /// Create a waiting vehicle.
    ///
    /// Fails when the destination equals the origin, since that movement has
    /// no turn classification.
    pub fn new(
        id: impl Into<VehicleId>,
        origin: Direction,
        destination: Direction,
    ) -> Result<Self, SimulationError> {
        let id = id.into();
        let turn = TurnType::between(origin, destination).ok_or_else(|| SimulationError::UTurn {
            vehicle_id: id.to_string(),
            direction: origin,
        })?;

        Ok(Self {
            id,
            origin,
            destination,
            state: VehicleState::Waiting,
            waited_ticks: 0,
            turn,
        })
    }

    /// Age the vehicle by one tick if it is still waiting
    pub fn advance(&mut self) {
        if self.state == VehicleState::Waiting {
            self.waited_ticks = self.waited_ticks.saturating_add(1);
        }
    }

    /// Move from WAITING to CROSSING; a no-op in any other state
    pub fn begin_crossing(&mut self) {
        if self.state == VehicleState::Waiting {
            self.state = VehicleState::Crossing;
        }
    }

    /// Crossing takes a single tick, so a crossing vehicle is done right after
    pub fn complete(&mut self) {
        if self.state == VehicleState::Crossing {
            self.state = VehicleState::Completed;
        }
    }

    pub fn turn_type(&self) -> TurnType {
        self.turn
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn waited_ticks(&self) -> u32 {
        self.waited_ticks
    }
}
