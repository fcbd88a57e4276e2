//! Core type definitions for the simulation.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when checking that seed probabilities sum to one
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// State held by a single grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    /// No organism or resource present
    #[default]
    Empty,
    /// Silicon substrate, consumable by diatoms
    Resource,
    /// Living diatom cell
    Consumer,
}

impl Cell {
    pub fn all() -> [Cell; 3] {
        [Cell::Empty, Cell::Resource, Cell::Consumer]
    }

    /// Grayscale display value for this state.
    pub fn intensity(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Resource => 255,
            Cell::Consumer => 127,
        }
    }

    /// Single character used by the textual grid format
    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Resource => 'S',
            Cell::Consumer => 'D',
        }
    }

    /// Parse a glyph. Accepts the `.`/`S`/`D` glyphs as well as the
    /// `E`/`R`/`C` initials, case-insensitive.
    pub fn from_glyph(glyph: char) -> Option<Cell> {
        match glyph.to_ascii_uppercase() {
            '.' | 'E' => Some(Cell::Empty),
            'S' | 'R' => Some(Cell::Resource),
            'D' | 'C' => Some(Cell::Consumer),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Row/column position on the torus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: isize,
    pub col: isize,
}

impl Position {
    pub fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }

    pub fn add(&self, drow: isize, dcol: isize) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// Apply toroidal wrapping for a square grid of the given size
    pub fn wrap(&self, size: usize) -> Self {
        let n = size as isize;
        Self {
            row: self.row.rem_euclid(n),
            col: self.col.rem_euclid(n),
        }
    }
}

/// Orthogonal neighbor directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// (row, col) offset
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::Left,
            Direction::Right,
            Direction::Up,
            Direction::Down,
        ]
    }
}

/// Count of each state among a cell's four orthogonal neighbors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborCensus {
    pub empty: u8,
    pub resource: u8,
    pub consumer: u8,
}

impl NeighborCensus {
    pub fn from_cells(cells: &[Cell]) -> Self {
        let mut census = Self::default();
        for &cell in cells {
            census.record(cell);
        }
        census
    }

    pub fn record(&mut self, cell: Cell) {
        match cell {
            Cell::Empty => self.empty += 1,
            Cell::Resource => self.resource += 1,
            Cell::Consumer => self.consumer += 1,
        }
    }
}

/// Count of each state across a whole grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub empty: usize,
    pub resource: usize,
    pub consumer: usize,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cell: Cell) {
        match cell {
            Cell::Empty => self.empty += 1,
            Cell::Resource => self.resource += 1,
            Cell::Consumer => self.consumer += 1,
        }
    }

    pub fn count(&self, cell: Cell) -> usize {
        match cell {
            Cell::Empty => self.empty,
            Cell::Resource => self.resource,
            Cell::Consumer => self.consumer,
        }
    }

    pub fn total(&self) -> usize {
        self.empty + self.resource + self.consumer
    }

    /// Share of the grid in the given state (0.0 for an empty population)
    pub fn fraction(&self, cell: Cell) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(cell) as f64 / total as f64
        }
    }
}

/// Discrete probability distribution over the three cell states, used to
/// seed a fresh grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedDistribution {
    pub empty: f64,
    pub resource: f64,
    pub consumer: f64,
}

impl SeedDistribution {
    /// Build a validated distribution
    pub fn new(empty: f64, resource: f64, consumer: f64) -> Result<Self> {
        let dist = Self {
            empty,
            resource,
            consumer,
        };
        dist.validate()?;
        Ok(dist)
    }

    pub fn probability(&self, cell: Cell) -> f64 {
        match cell {
            Cell::Empty => self.empty,
            Cell::Resource => self.resource,
            Cell::Consumer => self.consumer,
        }
    }

    /// Check that every probability is finite and non-negative and that they
    /// sum to one within [`DISTRIBUTION_TOLERANCE`].
    pub fn validate(&self) -> Result<()> {
        for cell in Cell::all() {
            let p = self.probability(cell);
            if !p.is_finite() || p < 0.0 {
                return Err(Error::InvalidDistribution(format!(
                    "probability for {:?} is {}",
                    cell, p
                )));
            }
        }

        let sum = self.empty + self.resource + self.consumer;
        if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(Error::InvalidDistribution(format!(
                "probabilities sum to {}, expected 1.0",
                sum
            )));
        }

        Ok(())
    }

    /// Weighted draw using a cumulative-probability lookup.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        let roll = rng.gen::<f64>();
        let mut cumulative = 0.0;
        let mut last_possible = Cell::Empty;

        for cell in Cell::all() {
            let p = self.probability(cell);
            if p <= 0.0 {
                continue;
            }
            cumulative += p;
            last_possible = cell;
            if roll < cumulative {
                return cell;
            }
        }

        // Rounding can leave the cumulative sum a hair under 1.0
        last_possible
    }
}
