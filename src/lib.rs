//! Intersection Simulation Library
//!
//! A tick-driven simulation of one four-way signalised intersection that can
//! be replayed from command logs or driven directly.

pub mod commands;
pub mod generator;
pub mod simulation;
