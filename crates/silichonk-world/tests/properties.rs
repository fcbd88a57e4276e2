//! Property-based tests for the transition engine.
//!
//! Grids are generated as arbitrary cell vectors, so every combination of
//! neighborhoods is reachable, not only those the seeding presets favour.

use proptest::prelude::*;
use silichonk_core::Cell;
use silichonk_world::{step, step_parallel, Grid, RuleSet};

fn arb_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![Just(Cell::Empty), Just(Cell::Resource), Just(Cell::Consumer)]
}

fn arb_grid() -> impl Strategy<Value = Grid> {
    (1usize..=12).prop_flat_map(|size| {
        prop::collection::vec(prop::collection::vec(arb_cell(), size), size)
            .prop_map(|rows| Grid::from_rows(rows).expect("rows are square"))
    })
}

fn arb_rules() -> impl Strategy<Value = RuleSet> {
    prop_oneof![Just(RuleSet::variant_a()), Just(RuleSet::variant_b())]
}

// =============================================================================
// Engine contract
// =============================================================================

proptest! {
    /// Equal inputs always give equal outputs
    #[test]
    fn prop_step_is_deterministic(grid in arb_grid(), rules in arb_rules()) {
        let copy = grid.clone();
        prop_assert_eq!(step(&grid, &rules), step(&copy, &rules));
    }

    /// The successor has the same side length
    #[test]
    fn prop_step_preserves_dimensions(grid in arb_grid(), rules in arb_rules()) {
        prop_assert_eq!(step(&grid, &rules).size(), grid.size());
    }

    /// Mutating the successor never touches the input
    #[test]
    fn prop_output_is_independent(grid in arb_grid(), rules in arb_rules()) {
        let before = grid.clone();
        let mut next = step(&grid, &rules);
        let size = next.size() as isize;
        for row in 0..size {
            for col in 0..size {
                next.set(row, col, Cell::Consumer);
            }
        }
        prop_assert_eq!(grid, before);
    }

    /// Row-parallel and sequential passes agree
    #[test]
    fn prop_parallel_matches_sequential(grid in arb_grid(), rules in arb_rules()) {
        prop_assert_eq!(step_parallel(&grid, &rules), step(&grid, &rules));
    }

    /// Each output cell depends only on the input cell and its census
    #[test]
    fn prop_cells_follow_rule_table(grid in arb_grid(), rules in arb_rules()) {
        let next = step(&grid, &rules);
        for (pos, cell) in grid.iter() {
            let census = grid.census(pos.row, pos.col);
            prop_assert_eq!(next.get_at(pos), rules.next_state(cell, census));
        }
    }
}

// =============================================================================
// Toroidal addressing
// =============================================================================

proptest! {
    /// get(i, j) == get(i + N, j) == get(i, j + N), also for negative shifts
    #[test]
    fn prop_indices_wrap(grid in arb_grid(), row in -30isize..30, col in -30isize..30) {
        let n = grid.size() as isize;
        let cell = grid.get(row, col);
        prop_assert_eq!(cell, grid.get(row + n, col));
        prop_assert_eq!(cell, grid.get(row, col + n));
        prop_assert_eq!(cell, grid.get(row - n, col - n));
    }

    /// First and last rows/columns are mutual neighbors
    #[test]
    fn prop_edges_are_adjacent(grid in arb_grid(), k in 0usize..12) {
        let n = grid.size() as isize;
        let k = (k as isize) % n;
        let [left, _, up, _] = grid.neighbors(0, 0);
        prop_assert_eq!(left, grid.get(0, n - 1));
        prop_assert_eq!(up, grid.get(n - 1, 0));

        let [_, right, _, down] = grid.neighbors(n - 1, k);
        prop_assert_eq!(right, grid.get(n - 1, k + 1));
        prop_assert_eq!(down, grid.get(0, k));
    }
}

// =============================================================================
// Fixed points
// =============================================================================

proptest! {
    /// An all-empty grid stays empty under both variants
    #[test]
    fn prop_empty_grid_is_stable(size in 1usize..=20, rules in arb_rules()) {
        let grid = Grid::new(size).unwrap();
        prop_assert_eq!(step(&grid, &rules), grid);
    }

    /// A consumer with only empty neighbors starves into a resource
    #[test]
    fn prop_isolated_consumer_starves(
        size in 3usize..=20,
        row in 0isize..20,
        col in 0isize..20,
        rules in arb_rules(),
    ) {
        let mut grid = Grid::new(size).unwrap();
        grid.set(row, col, Cell::Consumer);
        let next = step(&grid, &rules);
        prop_assert_eq!(next.get(row, col), Cell::Resource);
        prop_assert_eq!(next.population().resource, 1);
        prop_assert_eq!(next.population().consumer, 0);
    }
}
