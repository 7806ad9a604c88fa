//! Per-approach FIFO queues of waiting vehicles

use std::collections::VecDeque;
use std::ops::Index;

use super::types::Direction;
use super::vehicle::Vehicle;

/// Four FIFO queues keyed by origin direction
#[derive(Debug, Clone, Default)]
pub struct Queues([VecDeque<Vehicle>; 4]);

impl Queues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue at the tail of the vehicle's origin queue
    pub fn push(&mut self, vehicle: Vehicle) {
        self.0[vehicle.origin.index()].push_back(vehicle);
    }

    pub fn pop(&mut self, direction: Direction) -> Option<Vehicle> {
        self.0[direction.index()].pop_front()
    }

    pub fn head(&self, direction: Direction) -> Option<&Vehicle> {
        self.0[direction.index()].front()
    }

    pub fn len(&self, direction: Direction) -> usize {
        self.0[direction.index()].len()
    }

    pub fn is_empty(&self, direction: Direction) -> bool {
        self.0[direction.index()].is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(VecDeque::len).sum()
    }

    /// Queue lengths in direction order
    pub fn lengths(&self) -> [usize; 4] {
        [self.0[0].len(), self.0[1].len(), self.0[2].len(), self.0[3].len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &VecDeque<Vehicle>)> {
        Direction::ALL.into_iter().zip(self.0.iter())
    }

    pub fn vehicles_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.0.iter_mut().flat_map(|queue| queue.iter_mut())
    }
}

impl Index<Direction> for Queues {
    type Output = VecDeque<Vehicle>;

    fn index(&self, direction: Direction) -> &VecDeque<Vehicle> {
        &self.0[direction.index()]
    }
}
