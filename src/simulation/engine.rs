//! Main simulation engine that ties everything together
//!
//! Owns the per-direction queues and the intersection, executes one tick per
//! `step()` and keeps the log of step reports that a run produces.

use std::sync::mpsc::{self, Receiver, Sender};

use log::debug;
use serde::{Deserialize, Serialize};

use super::config::IntersectionConfig;
use super::error::SimulationError;
use super::intersection::Intersection;
use super::policy::PolicyKind;
use super::queues::Queues;
use super::stats::SimulationStats;
use super::types::{Direction, LightState, VehicleId};
use super::vehicle::Vehicle;

/// Vehicles that departed during one tick, in resolution order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepReport {
    #[serde(rename = "leftVehicles")]
    pub left_vehicles: Vec<VehicleId>,
}

impl StepReport {
    pub fn contains(&self, id: &str) -> bool {
        self.left_vehicles.iter().any(|v| v.as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.left_vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left_vehicles.is_empty()
    }
}

/// A queued vehicle as seen by observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedVehicle {
    pub id: VehicleId,
    pub origin: Direction,
    pub destination: Direction,
}

/// Read-only view of the engine handed to observers after each step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSnapshot {
    pub tick: u64,
    pub policy: PolicyKind,
    pub lights: [LightState; 4],
    pub queues: [Vec<QueuedVehicle>; 4],
    /// IDs that departed in the step that produced this snapshot
    pub departed: Vec<VehicleId>,
}

impl SimulationSnapshot {
    pub fn light(&self, direction: Direction) -> LightState {
        self.lights[direction.index()]
    }

    pub fn queue(&self, direction: Direction) -> &[QueuedVehicle] {
        &self.queues[direction.index()]
    }

    /// Multi-line console rendering, one line per approach
    pub fn render(&self) -> String {
        let mut out = format!("tick {:>4} [{}]", self.tick, self.policy);
        if !self.departed.is_empty() {
            let ids: Vec<&str> = self.departed.iter().map(VehicleId::as_str).collect();
            out.push_str(&format!(" departed: {}", ids.join(", ")));
        }
        for direction in Direction::ALL {
            let waiting: Vec<String> = self
                .queue(direction)
                .iter()
                .map(|v| format!("{}->{}", v.id, v.destination))
                .collect();
            out.push_str(&format!(
                "\n  {:<5} {} | {}",
                direction.name(),
                self.light(direction).symbol(),
                waiting.join(" ")
            ));
        }
        out
    }
}

type Observer = Box<dyn FnMut(&SimulationSnapshot)>;

/// Discrete-time simulation of a single intersection
pub struct SimulationEngine {
    intersection: Intersection,
    queues: Queues,
    completed: Vec<Vehicle>,
    step_reports: Vec<StepReport>,
    observers: Vec<Observer>,
    subscribers: Vec<Sender<SimulationSnapshot>>,
    tick: u64,
    vehicles_added: usize,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine {
    /// Engine running fixed rotation with default timings
    pub fn new() -> Self {
        Self::with_config(PolicyKind::default(), IntersectionConfig::default())
    }

    pub fn with_policy(kind: PolicyKind) -> Self {
        Self::with_config(kind, IntersectionConfig::default())
    }

    pub fn with_config(kind: PolicyKind, config: IntersectionConfig) -> Self {
        Self {
            intersection: Intersection::new(kind, config),
            queues: Queues::new(),
            completed: Vec::new(),
            step_reports: Vec::new(),
            observers: Vec::new(),
            subscribers: Vec::new(),
            tick: 0,
            vehicles_added: 0,
        }
    }

    /// Queue a new vehicle at the tail of its origin's queue
    pub fn add_vehicle(
        &mut self,
        id: impl Into<VehicleId>,
        origin: Direction,
        destination: Direction,
    ) -> Result<(), SimulationError> {
        let vehicle = Vehicle::new(id, origin, destination)?;
        debug!("{} queued at {} heading {}", vehicle.id, origin, destination);
        self.queues.push(vehicle);
        self.vehicles_added += 1;
        Ok(())
    }

    /// Run one tick: advance the lights, let cleared vehicles cross, age the
    /// rest, record the report and notify observers.
    pub fn step(&mut self) -> &StepReport {
        self.tick += 1;
        self.intersection.update(&self.queues);

        let mut report = StepReport::default();
        self.intersection
            .process_vehicles(&mut self.queues, &mut report.left_vehicles, &mut self.completed);

        for vehicle in self.queues.vehicles_mut() {
            vehicle.advance();
        }

        let snapshot = self.snapshot(report.left_vehicles.clone());
        self.step_reports.push(report);
        self.notify(snapshot);

        &self.step_reports[self.step_reports.len() - 1]
    }

    /// Change the scheduling policy between ticks. Takes effect from the next
    /// `step()`; re-selecting the active policy is a no-op.
    pub fn set_policy(&mut self, kind: PolicyKind) -> bool {
        let switched = self.intersection.set_policy(kind);
        if switched {
            let snapshot = self.snapshot(Vec::new());
            self.notify(snapshot);
        }
        switched
    }

    /// Register a listener called synchronously after every step
    pub fn add_observer(&mut self, observer: impl FnMut(&SimulationSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Receive a snapshot per step over a channel instead of a callback
    pub fn subscribe(&mut self) -> Receiver<SimulationSnapshot> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    fn notify(&mut self, snapshot: SimulationSnapshot) {
        for observer in &mut self.observers {
            observer(&snapshot);
        }
        // Drop subscribers whose receiver has gone away
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }

    pub fn snapshot(&self, departed: Vec<VehicleId>) -> SimulationSnapshot {
        let queues: [Vec<QueuedVehicle>; 4] = Direction::ALL.map(|direction| {
            self.queues[direction]
                .iter()
                .map(|v| QueuedVehicle {
                    id: v.id.clone(),
                    origin: v.origin,
                    destination: v.destination,
                })
                .collect()
        });

        SimulationSnapshot {
            tick: self.tick,
            policy: self.intersection.policy_kind(),
            lights: self.intersection.signals().states(),
            queues,
            departed,
        }
    }

    pub fn stats(&self) -> SimulationStats {
        let waiting_max = self
            .queues
            .iter()
            .flat_map(|(_, queue)| queue.iter())
            .map(Vehicle::waited_ticks)
            .max()
            .unwrap_or(0);
        let departed_max = self
            .completed
            .iter()
            .map(Vehicle::waited_ticks)
            .max()
            .unwrap_or(0);

        SimulationStats {
            steps: self.tick,
            vehicles_added: self.vehicles_added,
            vehicles_departed: self.completed.len(),
            vehicles_waiting: self.queues.total(),
            total_wait_ticks: self
                .completed
                .iter()
                .map(|v| u64::from(v.waited_ticks()))
                .sum(),
            max_wait_ticks: waiting_max.max(departed_max),
        }
    }

    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    pub fn queues(&self) -> &Queues {
        &self.queues
    }

    pub fn queue(&self, direction: Direction) -> impl Iterator<Item = &Vehicle> {
        self.queues[direction].iter()
    }

    pub fn completed(&self) -> &[Vehicle] {
        &self.completed
    }

    pub fn step_reports(&self) -> &[StepReport] {
        &self.step_reports
    }

    pub fn into_step_reports(self) -> Vec<StepReport> {
        self.step_reports
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.intersection.policy_kind()
    }

    pub fn current_green_direction(&self) -> Option<Direction> {
        self.intersection.current_green_direction()
    }
}
