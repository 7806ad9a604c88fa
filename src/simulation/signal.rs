//! Traffic lights for the four approaches

use std::ops::{Index, IndexMut};

use super::types::{Direction, LightState};

/// One traffic light: a state and a countdown in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signal {
    state: LightState,
    remaining_ticks: u32,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite state and countdown. Transition legality is the policy's job.
    pub fn set_state(&mut self, state: LightState, duration: u32) {
        self.state = state;
        self.remaining_ticks = duration;
    }

    /// Count down one tick, floored at zero
    pub fn tick(&mut self) {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_ticks == 0
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }
}

/// The four signals of an intersection, indexed by approach
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals([Signal; 4]);

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_all(&mut self) {
        for signal in &mut self.0 {
            signal.tick();
        }
    }

    pub fn state(&self, direction: Direction) -> LightState {
        self[direction].state()
    }

    /// Set every listed direction to the same state and duration
    pub fn set_all(&mut self, directions: &[Direction], state: LightState, duration: u32) {
        for &direction in directions {
            self[direction].set_state(state, duration);
        }
    }

    /// Light state per direction, in direction order
    pub fn states(&self) -> [LightState; 4] {
        Direction::ALL.map(|direction| self[direction].state())
    }
}

impl Index<Direction> for Signals {
    type Output = Signal;

    fn index(&self, direction: Direction) -> &Signal {
        &self.0[direction.index()]
    }
}

impl IndexMut<Direction> for Signals {
    fn index_mut(&mut self, direction: Direction) -> &mut Signal {
        &mut self.0[direction.index()]
    }
}
