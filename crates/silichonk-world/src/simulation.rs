//! Simulation driver that owns the current generation.

use crate::engine::Engine;
use crate::grid::Grid;
use crate::rules::RuleSet;
use parking_lot::RwLock;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use silichonk_core::{Cell, Error, Population, Result, SimulationConfig};
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, event, info, instrument, Level};

/// Handle to the current generation shared with observers (renderers).
///
/// The driver only ever replaces the whole grid under one write lock, so a
/// reader always sees a complete generation.
pub type SharedGrid = Arc<RwLock<Grid>>;

pub struct Simulation {
    grid: SharedGrid,
    engine: Engine,
    config: SimulationConfig,
    generation: u64,
    // (fingerprint, generation, grid) for the most recent generations
    history: VecDeque<(u64, u64, Grid)>,
    cycle_detected_at: Option<u64>,
}

impl Simulation {
    /// Seed a fresh random grid from `config.seed`
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = Grid::from_config(&config.world, &mut rng)?;
        Self::from_grid(grid, config)
    }

    /// Start from an explicit grid. The grid's size overrides `config.world.size`.
    pub fn from_grid(grid: Grid, mut config: SimulationConfig) -> Result<Self> {
        if config.cycle_window < 1 {
            return Err(Error::InvalidConfig(
                "cycle_window must be at least 1".to_string(),
            ));
        }
        config.world.size = grid.size();

        let mut history = VecDeque::with_capacity(config.cycle_window + 1);
        history.push_back((fingerprint(&grid), 0, grid.clone()));

        Ok(Self {
            grid: Arc::new(RwLock::new(grid)),
            engine: Engine::from_config(&config),
            config,
            generation: 0,
            history,
            cycle_detected_at: None,
        })
    }

    /// Run the simulation for `config.num_frames` generations
    #[instrument(skip(self), fields(
        num_frames = self.config.num_frames,
        size = self.config.world.size,
        variant = %self.config.world.variant
    ))]
    pub fn run(&mut self) -> SimulationResult {
        info!(
            "Starting simulation for {} generations",
            self.config.num_frames
        );

        for _ in 0..self.config.num_frames {
            let report = self.tick();

            if report.cycle.is_some() && self.config.stop_on_cycle {
                info!(
                    generation = report.generation,
                    "Stopping early: generation repeats an earlier one"
                );
                break;
            }
        }

        let result = self.summary();
        info!(
            event = "run_summary",
            generations = result.generations,
            empty = result.final_population.empty,
            resource = result.final_population.resource,
            consumer = result.final_population.consumer,
            cycle_detected_at = ?result.cycle_detected_at,
            "Simulation complete"
        );
        result
    }

    /// Compute and install the next generation
    pub fn tick(&mut self) -> TickReport {
        let next = {
            let current = self.grid.read();
            self.engine.step(&current)
        };
        let population = next.population();
        let print = fingerprint(&next);
        let kept = next.clone();

        *self.grid.write() = next;
        self.generation += 1;

        let cycle = self.remember(print, kept);
        if let Some(previous) = cycle {
            if self.cycle_detected_at.is_none() {
                self.cycle_detected_at = Some(self.generation);
                info!(
                    generation = self.generation,
                    repeats = previous,
                    "Cycle detected"
                );
            }
        }

        debug!(
            generation = self.generation,
            empty = population.empty,
            resource = population.resource,
            consumer = population.consumer,
            "Generation computed"
        );

        if self.config.metrics_interval > 0 && self.generation % self.config.metrics_interval == 0 {
            self.emit_population_metrics(&population);
        }

        TickReport {
            generation: self.generation,
            population,
            cycle,
        }
    }

    /// Record the current generation; returns the generation it repeats, if
    /// any. Fingerprints only narrow the search, the grids must be equal.
    fn remember(&mut self, print: u64, grid: Grid) -> Option<u64> {
        let repeated = self
            .history
            .iter()
            .find(|(seen, _, earlier)| *seen == print && *earlier == grid)
            .map(|(_, generation, _)| *generation);

        self.history.push_back((print, self.generation, grid));
        while self.history.len() > self.config.cycle_window {
            self.history.pop_front();
        }

        repeated
    }

    fn emit_population_metrics(&self, population: &Population) {
        info!(
            event = "population_metrics",
            generation = self.generation,
            empty = population.empty,
            resource = population.resource,
            consumer = population.consumer,
            consumer_share = format!("{:.2}%", population.fraction(Cell::Consumer) * 100.0),
            "Population snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "consumer_population",
            gauge_value = population.consumer,
            generation = self.generation,
            "Consumer population gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "resource_population",
            gauge_value = population.resource,
            generation = self.generation,
            "Resource population gauge"
        );
    }

    /// Results as of the current generation
    pub fn summary(&self) -> SimulationResult {
        SimulationResult {
            generations: self.generation,
            final_population: self.population(),
            cycle_detected_at: self.cycle_detected_at,
        }
    }

    /// Handle for observers that read the current generation
    pub fn shared_grid(&self) -> SharedGrid {
        self.grid.clone()
    }

    /// Independent copy of the current generation
    pub fn snapshot(&self) -> Grid {
        self.grid.read().clone()
    }

    pub fn population(&self) -> Population {
        self.grid.read().population()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rules(&self) -> &RuleSet {
        self.engine.rules()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn cycle_detected_at(&self) -> Option<u64> {
        self.cycle_detected_at
    }
}

fn fingerprint(grid: &Grid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.hash(&mut hasher);
    hasher.finish()
}

/// Outcome of a single generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub generation: u64,
    pub population: Population,
    /// Earlier generation this one is identical to, if still in the window
    pub cycle: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub generations: u64,
    pub final_population: Population,
    pub cycle_detected_at: Option<u64>,
}
