//! Square toroidal grid of cell states.

use rand::Rng;
use silichonk_core::{
    Cell, Direction, Error, NeighborCensus, Population, Position, Result, SeedDistribution,
    WorldConfig,
};
use std::fmt;
use std::str::FromStr;

/// An `N x N` toroidal grid.
///
/// The side length is fixed at construction. Every read and write goes
/// through modular addressing, so any signed index is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(size: usize) -> Result<Self> {
        Self::filled(size, Cell::Empty)
    }

    pub fn filled(size: usize, cell: Cell) -> Result<Self> {
        if size < 1 {
            return Err(Error::InvalidSize(size));
        }
        Ok(Self {
            size,
            cells: vec![cell; size * size],
        })
    }

    /// Create a grid whose cells are drawn independently from `distribution`
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        distribution: &SeedDistribution,
        rng: &mut R,
    ) -> Result<Self> {
        if size < 1 {
            return Err(Error::InvalidSize(size));
        }
        distribution.validate()?;

        let cells = (0..size * size)
            .map(|_| distribution.sample(rng))
            .collect();

        Ok(Self { size, cells })
    }

    /// Create a grid from world configuration
    pub fn from_config<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Result<Self> {
        Self::random(config.size, &config.seed_distribution(), rng)
    }

    /// Build a grid from explicit rows. The rows must form a non-empty square.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let size = rows.len();
        if size < 1 {
            return Err(Error::InvalidSize(size));
        }

        let mut cells = Vec::with_capacity(size * size);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(Error::InvalidConfig(format!(
                    "row {} has {} cells, expected {}",
                    idx,
                    row.len(),
                    size
                )));
            }
            cells.extend(row);
        }

        Ok(Self { size, cells })
    }

    /// Wrap an already-computed cell buffer. `cells.len()` must be `size * size`.
    pub(crate) fn from_cells(size: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the state at `(row, col)` (with toroidal wrapping)
    pub fn get(&self, row: isize, col: isize) -> Cell {
        self.get_at(Position::new(row, col))
    }

    pub fn get_at(&self, pos: Position) -> Cell {
        self.cells[self.pos_to_index(pos.wrap(self.size))]
    }

    /// Set the state at `(row, col)` (with toroidal wrapping)
    pub fn set(&mut self, row: isize, col: isize, cell: Cell) {
        self.set_at(Position::new(row, col), cell);
    }

    pub fn set_at(&mut self, pos: Position, cell: Cell) {
        let index = self.pos_to_index(pos.wrap(self.size));
        self.cells[index] = cell;
    }

    /// Orthogonal neighbors in the order left, right, up, down
    pub fn neighbors(&self, row: isize, col: isize) -> [Cell; 4] {
        let pos = Position::new(row, col);
        Direction::all().map(|dir| {
            let (drow, dcol) = dir.to_delta();
            self.get_at(pos.add(drow, dcol))
        })
    }

    pub fn census(&self, row: isize, col: isize) -> NeighborCensus {
        NeighborCensus::from_cells(&self.neighbors(row, col))
    }

    /// Count of each state across the grid
    pub fn population(&self) -> Population {
        let mut population = Population::new();
        for &cell in &self.cells {
            population.record(cell);
        }
        population
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        pos.row as usize * self.size + pos.col as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new((index / self.size) as isize, (index % self.size) as isize)
    }

    /// Iterator over all cells with positions, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (self.index_to_pos(i), cell))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.size)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                write!(f, "{}", cell.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = Error;

    /// Parse one row per non-blank line; whitespace inside a line is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| {
                        Cell::from_glyph(c).ok_or_else(|| {
                            Error::InvalidConfig(format!("unknown cell glyph '{}'", c))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_rows(rows)
    }
}
