//! Simulation statistics

use std::fmt;

/// Totals over everything an engine has simulated so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationStats {
    pub steps: u64,
    pub vehicles_added: usize,
    pub vehicles_departed: usize,
    pub vehicles_waiting: usize,
    /// Sum of the ticks departed vehicles spent waiting
    pub total_wait_ticks: u64,
    /// Longest wait of any vehicle, departed or still queued
    pub max_wait_ticks: u32,
}

impl SimulationStats {
    /// Mean ticks waited by departed vehicles
    pub fn mean_wait(&self) -> f64 {
        if self.vehicles_departed == 0 {
            0.0
        } else {
            self.total_wait_ticks as f64 / self.vehicles_departed as f64
        }
    }

    /// Share of added vehicles that have crossed, in percent
    pub fn throughput_percent(&self) -> f64 {
        if self.vehicles_added == 0 {
            0.0
        } else {
            self.vehicles_departed as f64 / self.vehicles_added as f64 * 100.0
        }
    }

    /// Write the end-of-run block to the log
    pub fn log_summary(&self) {
        log::info!("=== SIMULATION COMPLETE ===");
        log::info!("Steps: {}", self.steps);
        log::info!("Total vehicles added: {}", self.vehicles_added);
        log::info!("Total vehicles departed: {}", self.vehicles_departed);
        log::info!("Still waiting: {}", self.vehicles_waiting);
        log::info!("Mean wait: {:.2} ticks", self.mean_wait());
        log::info!("Max wait: {} ticks", self.max_wait_ticks);
        log::info!("Throughput: {:.1}%", self.throughput_percent());
    }
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "steps: {} | departed: {}/{} | waiting: {} | mean wait: {:.2} | max wait: {}",
            self.steps,
            self.vehicles_departed,
            self.vehicles_added,
            self.vehicles_waiting,
            self.mean_wait(),
            self.max_wait_ticks
        )
    }
}
