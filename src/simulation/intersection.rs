//! Intersection logic for the simulation
//!
//! Owns the four signals and the active scheduling policy, and turns the
//! policy's per-direction decisions into the set of vehicles that cross.

use log::{debug, info};

use super::config::IntersectionConfig;
use super::policy::{Clearance, PolicyKind, SchedulingPolicy};
use super::queues::Queues;
use super::signal::{Signal, Signals};
use super::types::{Direction, LightState, VehicleId};
use super::vehicle::Vehicle;

/// A four-way intersection controlled by traffic lights
#[derive(Debug, Clone)]
pub struct Intersection {
    signals: Signals,
    policy: SchedulingPolicy,
    config: IntersectionConfig,
}

impl Default for Intersection {
    fn default() -> Self {
        Self::new(PolicyKind::default(), IntersectionConfig::default())
    }
}

impl Intersection {
    pub fn new(kind: PolicyKind, config: IntersectionConfig) -> Self {
        let mut signals = Signals::new();
        let policy = SchedulingPolicy::new(kind, &config, &mut signals);
        Self {
            signals,
            policy,
            config,
        }
    }

    pub fn signal(&self, direction: Direction) -> &Signal {
        &self.signals[direction]
    }

    pub fn light_state(&self, direction: Direction) -> LightState {
        self.signals.state(direction)
    }

    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn config(&self) -> &IntersectionConfig {
        &self.config
    }

    /// Switch to another policy. Re-selecting the active one changes nothing;
    /// a real switch drops the old policy's state and restarts the phase.
    /// Returns whether a switch happened.
    pub fn set_policy(&mut self, kind: PolicyKind) -> bool {
        if self.policy.kind() == kind {
            return false;
        }
        info!("Switching signal policy from {} to {}", self.policy.kind(), kind);
        self.policy = SchedulingPolicy::new(kind, &self.config, &mut self.signals);
        true
    }

    pub fn current_green_direction(&self) -> Option<Direction> {
        self.policy.current_green_direction(&self.signals)
    }

    /// Advance signal timers and the policy's phase by one tick
    pub fn update(&mut self, queues: &Queues) {
        if self.policy.needs_queue_lengths() {
            self.policy.update_queue_lengths(queues.lengths());
        }
        self.policy.advance_phase(&mut self.signals);
    }

    /// Directions whose head vehicle may cross this tick, in direction order.
    ///
    /// Unprotected left turns are only released on a tick where no other
    /// direction has a plain clearance.
    pub fn resolve_crossings(&self, queues: &Queues) -> Vec<Direction> {
        let mut cleared = Vec::new();
        let mut left_turns = Vec::new();

        for direction in Direction::ALL {
            match self.policy.clearance(&self.signals, queues, direction) {
                Clearance::Clear => cleared.push(direction),
                Clearance::UnprotectedLeft => left_turns.push(direction),
                Clearance::Blocked => {}
            }
        }

        if cleared.is_empty() {
            left_turns
        } else {
            cleared
        }
    }

    /// Let at most one vehicle per cleared direction cross.
    ///
    /// Departed IDs are appended to `departed` in resolution order and the
    /// vehicles themselves to `completed`.
    pub fn process_vehicles(
        &self,
        queues: &mut Queues,
        departed: &mut Vec<VehicleId>,
        completed: &mut Vec<Vehicle>,
    ) {
        for direction in self.resolve_crossings(queues) {
            let Some(mut vehicle) = queues.pop(direction) else {
                continue;
            };
            vehicle.begin_crossing();
            vehicle.complete();
            debug!(
                "{} crossed from {} to {} ({:?}) after {} ticks",
                vehicle.id,
                vehicle.origin,
                vehicle.destination,
                vehicle.turn_type(),
                vehicle.waited_ticks()
            );
            departed.push(vehicle.id.clone());
            completed.push(vehicle);
        }
    }
}
