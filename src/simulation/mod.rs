//! Standalone intersection simulation module
//!
//! This module contains the signal scheduling and crossing-resolution core.
//! It runs tick by tick with no timing or I/O dependencies of its own; the
//! command source and any display attach from the outside.

mod config;
mod engine;
mod error;
mod intersection;
mod policy;
mod queues;
mod signal;
mod stats;
mod types;
mod vehicle;

pub use config::{
    IntersectionConfig, LeftTurnRule, PhaseTimings, DEFAULT_GREEN_TICKS,
    DEFAULT_PRIORITY_THRESHOLD, DEFAULT_RED_YELLOW_TICKS, DEFAULT_YELLOW_TICKS,
};
pub use engine::{QueuedVehicle, SimulationEngine, SimulationSnapshot, StepReport};
pub use error::SimulationError;
pub use intersection::Intersection;
pub use policy::{
    Clearance, FixedRotation, PairedAxis, Phase, PolicyKind, QueuePriority, SchedulingPolicy,
};
pub use queues::Queues;
pub use signal::{Signal, Signals};
pub use stats::SimulationStats;
pub use types::{Direction, LightState, TurnType, VehicleId};
pub use vehicle::{Vehicle, VehicleState};
