//! Seeded random traffic for demos and command-log generation
//!
//! All randomness lives here; the simulation core itself is deterministic.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::commands::Command;
use crate::simulation::Direction;

/// Shape of a generated command log
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    /// Upper bound on vehicles added over the whole log
    pub vehicles: usize,
    /// Number of step commands
    pub steps: usize,
    pub seed: u64,
    /// Chance of a new arrival before each step
    pub arrival_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vehicles: 20,
            steps: 30,
            seed: 42,
            arrival_probability: 0.8,
        }
    }
}

/// Pick a random trip with distinct origin and destination
pub fn random_trip(rng: &mut impl Rng) -> (Direction, Direction) {
    let origin = Direction::from_index(rng.random_range(0..4));
    let exits: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| d != origin)
        .collect();
    let destination = *exits.choose(rng).unwrap_or(&origin.opposite());
    (origin, destination)
}

/// Produce a command log: before each step a vehicle may arrive, up to the
/// configured total. The same seed always yields the same log.
///
/// A non-finite arrival probability produces no arrivals.
pub fn generate_commands(config: &GeneratorConfig) -> Vec<Command> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let probability = if config.arrival_probability.is_finite() {
        config.arrival_probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut commands = Vec::with_capacity(config.vehicles + config.steps);
    let mut added = 0;

    for _ in 0..config.steps {
        if added < config.vehicles && rng.random_bool(probability) {
            added += 1;
            let (origin, destination) = random_trip(&mut rng);
            commands.push(Command::AddVehicle {
                vehicle_id: format!("vehicle{}", added).into(),
                origin,
                destination,
            });
        }
        commands.push(Command::Step);
    }

    commands
}
