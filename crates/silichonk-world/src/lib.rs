//! World simulation engine.
//!
//! This crate implements the toroidal grid, the two rule tables, the
//! transition engine that turns one generation into the next, and the
//! driver that owns the current generation.

pub mod grid;
pub mod rules;
pub mod engine;
pub mod simulation;

pub use grid::Grid;
pub use rules::RuleSet;
pub use engine::{step, step_parallel, Engine, StepMode};
pub use simulation::{SharedGrid, Simulation, SimulationResult, TickReport};
