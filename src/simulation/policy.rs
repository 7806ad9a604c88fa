//! Scheduling policies deciding which approaches get right-of-way
//!
//! Every policy drives the same per-direction light cycle
//! GREEN -> YELLOW -> RED, with the next direction held on RED_YELLOW for one
//! phase before its GREEN. They differ in which directions are active together
//! and in how the next active direction is picked.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::config::{IntersectionConfig, LeftTurnRule, PhaseTimings};
use super::error::SimulationError;
use super::queues::Queues;
use super::signal::Signals;
use super::types::{Direction, LightState, TurnType};

/// Tag of a scheduling policy, used to select and compare policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Clockwise rotation, one direction at a time, fixed durations
    #[default]
    FixedRotation,
    /// Rotation that jumps to a direction whose queue reached the threshold
    QueuePriority,
    /// Opposite directions share GREEN, with unprotected left turns
    PairedAxis,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::FixedRotation,
        PolicyKind::QueuePriority,
        PolicyKind::PairedAxis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::FixedRotation => "fixed",
            PolicyKind::QueuePriority => "priority",
            PolicyKind::PairedAxis => "paired",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "fixed_rotation" | "standard" => Ok(PolicyKind::FixedRotation),
            "priority" | "queue_priority" => Ok(PolicyKind::QueuePriority),
            "paired" | "paired_axis" | "opposing" => Ok(PolicyKind::PairedAxis),
            _ => Err(SimulationError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Stage of the active direction(s) within the light cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Green,
    Yellow,
    RedYellow,
}

/// Whether the head vehicle of a direction may cross this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    Blocked,
    Clear,
    /// Cleared only as an unprotected left, yielding to any plain clearance
    UnprotectedLeft,
}

/// What a cycle step asks of its policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleStep {
    Hold,
    /// The active group just went RED; the policy must pick the next group
    ChooseNext,
}

/// The light cycle shared by all policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cycle {
    phase: Phase,
    timings: PhaseTimings,
}

impl Cycle {
    fn start(timings: PhaseTimings, signals: &mut Signals, active: &[Direction]) -> Self {
        for direction in Direction::ALL {
            if active.contains(&direction) {
                signals[direction].set_state(LightState::Green, timings.green);
            } else {
                signals[direction].set_state(LightState::Red, timings.cycle_length());
            }
        }
        Self {
            phase: Phase::Green,
            timings,
        }
    }

    /// Move the active group on once its countdown has run out.
    /// Signals must already have been ticked.
    fn step(&mut self, signals: &mut Signals, active: &[Direction]) -> CycleStep {
        if !signals[active[0]].is_finished() {
            return CycleStep::Hold;
        }

        match self.phase {
            Phase::Green => {
                signals.set_all(active, LightState::Yellow, self.timings.yellow);
                self.phase = Phase::Yellow;
                CycleStep::Hold
            }
            Phase::Yellow => {
                signals.set_all(active, LightState::Red, self.timings.cycle_length());
                CycleStep::ChooseNext
            }
            Phase::RedYellow => {
                signals.set_all(active, LightState::Green, self.timings.green);
                self.phase = Phase::Green;
                CycleStep::Hold
            }
        }
    }

    fn prepare(&mut self, signals: &mut Signals, next: &[Direction]) {
        signals.set_all(next, LightState::RedYellow, self.timings.red_yellow);
        self.phase = Phase::RedYellow;
    }
}

/// Plain GREEN check, optionally accepting YELLOW as a grace period
fn single_direction_clearance(signals: &Signals, direction: Direction, yellow_crossing: bool) -> Clearance {
    match signals.state(direction) {
        LightState::Green => Clearance::Clear,
        LightState::Yellow if yellow_crossing => Clearance::Clear,
        _ => Clearance::Blocked,
    }
}

/// Fixed clockwise rotation, ignoring queues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRotation {
    active: Direction,
    cycle: Cycle,
    yellow_crossing: bool,
}

impl FixedRotation {
    pub fn new(config: &IntersectionConfig, signals: &mut Signals) -> Self {
        let active = Direction::North;
        Self {
            active,
            cycle: Cycle::start(config.timings, signals, &[active]),
            yellow_crossing: config.yellow_crossing,
        }
    }

    fn advance(&mut self, signals: &mut Signals) {
        if self.cycle.step(signals, &[self.active]) == CycleStep::ChooseNext {
            self.active = self.active.clockwise();
            debug!("fixed rotation: {} is next", self.active);
            self.cycle.prepare(signals, &[self.active]);
        }
    }
}

/// Clockwise rotation that lets a long queue jump ahead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePriority {
    active: Direction,
    cycle: Cycle,
    yellow_crossing: bool,
    threshold: usize,
    /// Scheduling counters, refreshed from the real queues every tick
    queue_lengths: [usize; 4],
}

impl QueuePriority {
    pub fn new(config: &IntersectionConfig, signals: &mut Signals) -> Self {
        let active = Direction::North;
        Self {
            active,
            cycle: Cycle::start(config.timings, signals, &[active]),
            yellow_crossing: config.yellow_crossing,
            threshold: config.priority_threshold,
            queue_lengths: [0; 4],
        }
    }

    pub fn update_queue_lengths(&mut self, lengths: [usize; 4]) {
        self.queue_lengths = lengths;
    }

    pub fn queue_length(&self, direction: Direction) -> usize {
        self.queue_lengths[direction.index()]
    }

    /// Longest non-active queue at or above the threshold, else the clockwise
    /// neighbour. Ties go to the first direction clockwise from the active one.
    fn next_direction(&self) -> Direction {
        let mut best: Option<(Direction, usize)> = None;
        let mut candidate = self.active.clockwise();
        while candidate != self.active {
            let length = self.queue_length(candidate);
            if best.is_none_or(|(_, best_length)| length > best_length) {
                best = Some((candidate, length));
            }
            candidate = candidate.clockwise();
        }

        match best {
            Some((direction, length)) if length >= self.threshold => {
                debug!(
                    "queue priority: {} has {} waiting, jumping the rotation",
                    direction, length
                );
                direction
            }
            _ => self.active.clockwise(),
        }
    }

    fn advance(&mut self, signals: &mut Signals) {
        if self.cycle.step(signals, &[self.active]) == CycleStep::ChooseNext {
            self.active = self.next_direction();
            self.queue_lengths[self.active.index()] = 0;
            self.cycle.prepare(signals, &[self.active]);
        }
    }
}

/// Opposite approaches share right-of-way, alternating between the axes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedAxis {
    axis: [Direction; 2],
    cycle: Cycle,
    left_turn: LeftTurnRule,
    left_turn_window: u32,
}

impl PairedAxis {
    pub fn new(config: &IntersectionConfig, signals: &mut Signals) -> Self {
        let axis = Direction::North.axis();
        Self {
            axis,
            cycle: Cycle::start(config.timings, signals, &axis),
            left_turn: config.left_turn,
            left_turn_window: config.left_turn_window,
        }
    }

    fn advance(&mut self, signals: &mut Signals) {
        if self.cycle.step(signals, &self.axis) == CycleStep::ChooseNext {
            self.axis = self.axis[0].clockwise().axis();
            debug!("paired axis: switching to {}/{}", self.axis[0], self.axis[1]);
            self.cycle.prepare(signals, &self.axis);
        }
    }

    fn clearance(&self, signals: &Signals, queues: &Queues, direction: Direction) -> Clearance {
        let Some(head) = queues.head(direction) else {
            return Clearance::Blocked;
        };

        if head.turn_type() != TurnType::Left {
            return match signals.state(direction) {
                LightState::Green => Clearance::Clear,
                _ => Clearance::Blocked,
            };
        }

        if self.left_turn_allowed(signals, queues, direction) {
            Clearance::UnprotectedLeft
        } else {
            Clearance::Blocked
        }
    }

    fn left_turn_allowed(&self, signals: &Signals, queues: &Queues, direction: Direction) -> bool {
        let signal = signals[direction];
        match self.left_turn {
            LeftTurnRule::YellowOnly => signal.state() == LightState::Yellow,
            LeftTurnRule::OpposingQueue => {
                let end_of_phase = signal.state() == LightState::Yellow
                    || (signal.state() == LightState::Green
                        && signal.remaining_ticks() <= self.left_turn_window);
                if end_of_phase {
                    return true;
                }
                if signal.state() != LightState::Green {
                    return false;
                }
                // Oncoming traffic is either absent or also turning left
                match queues.head(direction.opposite()) {
                    None => true,
                    Some(oncoming) => oncoming.turn_type() == TurnType::Left,
                }
            }
        }
    }
}

/// The policy currently driving an intersection's signals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingPolicy {
    FixedRotation(FixedRotation),
    QueuePriority(QueuePriority),
    PairedAxis(PairedAxis),
}

impl SchedulingPolicy {
    /// Build a policy and set its initial phase on `signals`
    pub fn new(kind: PolicyKind, config: &IntersectionConfig, signals: &mut Signals) -> Self {
        match kind {
            PolicyKind::FixedRotation => Self::FixedRotation(FixedRotation::new(config, signals)),
            PolicyKind::QueuePriority => Self::QueuePriority(QueuePriority::new(config, signals)),
            PolicyKind::PairedAxis => Self::PairedAxis(PairedAxis::new(config, signals)),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::FixedRotation(_) => PolicyKind::FixedRotation,
            Self::QueuePriority(_) => PolicyKind::QueuePriority,
            Self::PairedAxis(_) => PolicyKind::PairedAxis,
        }
    }

    /// Tick every signal, then apply any due phase transition
    pub fn advance_phase(&mut self, signals: &mut Signals) {
        signals.tick_all();
        match self {
            Self::FixedRotation(policy) => policy.advance(signals),
            Self::QueuePriority(policy) => policy.advance(signals),
            Self::PairedAxis(policy) => policy.advance(signals),
        }
    }

    /// Whether this policy reads queue lengths before advancing
    pub fn needs_queue_lengths(&self) -> bool {
        matches!(self, Self::QueuePriority(_))
    }

    pub fn update_queue_lengths(&mut self, lengths: [usize; 4]) {
        if let Self::QueuePriority(policy) = self {
            policy.update_queue_lengths(lengths);
        }
    }

    /// Directions that own (or are about to own) right-of-way, primary first
    pub fn active_directions(&self) -> Vec<Direction> {
        match self {
            Self::FixedRotation(policy) => vec![policy.active],
            Self::QueuePriority(policy) => vec![policy.active],
            Self::PairedAxis(policy) => policy.axis.to_vec(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::FixedRotation(policy) => policy.cycle.phase,
            Self::QueuePriority(policy) => policy.cycle.phase,
            Self::PairedAxis(policy) => policy.cycle.phase,
        }
    }

    /// First active direction currently showing GREEN, if any
    pub fn current_green_direction(&self, signals: &Signals) -> Option<Direction> {
        self.active_directions()
            .into_iter()
            .find(|&direction| signals.state(direction) == LightState::Green)
    }

    /// Decide whether the head of `direction`'s queue may cross
    pub fn clearance(&self, signals: &Signals, queues: &Queues, direction: Direction) -> Clearance {
        if queues.is_empty(direction) {
            return Clearance::Blocked;
        }
        match self {
            Self::FixedRotation(policy) => {
                single_direction_clearance(signals, direction, policy.yellow_crossing)
            }
            Self::QueuePriority(policy) => {
                single_direction_clearance(signals, direction, policy.yellow_crossing)
            }
            Self::PairedAxis(policy) => policy.clearance(signals, queues, direction),
        }
    }
}
