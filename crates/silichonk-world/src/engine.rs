//! Transition engine: computes generation `t+1` from generation `t`.
//!
//! Every output cell is computed from the input grid only. The input is
//! borrowed immutably and the output is a freshly allocated grid, so an
//! update can never observe a partially written generation.

use crate::grid::Grid;
use crate::rules::RuleSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use silichonk_core::{Cell, SimulationConfig};

/// How a generation is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StepMode {
    #[default]
    Sequential,
    /// Rows are computed on the rayon thread pool
    Parallel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    rules: RuleSet,
    mode: StepMode,
}

impl Engine {
    pub fn new(rules: RuleSet, mode: StepMode) -> Self {
        Self { rules, mode }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let mode = if config.parallel {
            StepMode::Parallel
        } else {
            StepMode::Sequential
        };
        Self::new(RuleSet::from(config.world.variant), mode)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    pub fn step(&self, grid: &Grid) -> Grid {
        match self.mode {
            StepMode::Sequential => step(grid, &self.rules),
            StepMode::Parallel => step_parallel(grid, &self.rules),
        }
    }
}

/// Compute the next generation in a single pass.
pub fn step(grid: &Grid, rules: &RuleSet) -> Grid {
    let size = grid.size();
    let mut next = vec![Cell::Empty; size * size];

    for (row, out) in next.chunks_mut(size).enumerate() {
        compute_row(grid, rules, row, out);
    }

    Grid::from_cells(size, next)
}

/// Compute the next generation with rows spread across threads.
///
/// Produces exactly the same grid as [`step`].
pub fn step_parallel(grid: &Grid, rules: &RuleSet) -> Grid {
    let size = grid.size();
    let mut next = vec![Cell::Empty; size * size];

    next.par_chunks_mut(size)
        .enumerate()
        .for_each(|(row, out)| compute_row(grid, rules, row, out));

    Grid::from_cells(size, next)
}

fn compute_row(grid: &Grid, rules: &RuleSet, row: usize, out: &mut [Cell]) {
    let row = row as isize;
    for (col, slot) in out.iter_mut().enumerate() {
        let col = col as isize;
        *slot = rules.next_state(grid.get(row, col), grid.census(row, col));
    }
}
