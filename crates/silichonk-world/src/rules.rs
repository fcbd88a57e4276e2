//! Per-cell transition rules.
//!
//! Both rule tables share one shape: an empty cell is colonized by enough
//! consumer neighbors, a resource cell is either colonized or depleted
//! depending on how many consumers surround it, and a consumer reverts to
//! resource when it starves (no resource neighbor) or is crowded.

use silichonk_core::{Cell, NeighborCensus, RuleVariant};

/// Inclusive range of neighbor counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CountRange {
    min: u8,
    max: u8,
}

impl CountRange {
    const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    fn contains(&self, count: u8) -> bool {
        self.min <= count && count <= self.max
    }
}

/// Transition policy for one rule variant.
///
/// Only constructible from a [`RuleVariant`]; the thresholds are fixed per
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    variant: RuleVariant,
    birth_consumers: u8,
    birth_needs_resource: bool,
    colonize: CountRange,
    deplete: CountRange,
    crowding_limit: u8,
}

impl RuleSet {
    /// "Any" thresholds: a single neighbor of a kind triggers a reaction.
    pub const fn variant_a() -> Self {
        Self {
            variant: RuleVariant::A,
            birth_consumers: 1,
            birth_needs_resource: true,
            colonize: CountRange::new(2, 4),
            deplete: CountRange::new(1, 1),
            crowding_limit: 1,
        }
    }

    /// "Majority" thresholds: every consumer threshold shifted up by one.
    pub const fn variant_b() -> Self {
        Self {
            variant: RuleVariant::B,
            birth_consumers: 2,
            birth_needs_resource: false,
            colonize: CountRange::new(2, 2),
            deplete: CountRange::new(3, 4),
            crowding_limit: 2,
        }
    }

    pub fn variant(&self) -> RuleVariant {
        self.variant
    }

    /// Successor state of a cell given its own state and neighbor census
    pub fn next_state(&self, cell: Cell, census: NeighborCensus) -> Cell {
        match cell {
            Cell::Empty => {
                let fed = !self.birth_needs_resource || census.resource > 0;
                if census.consumer >= self.birth_consumers && fed {
                    Cell::Consumer
                } else {
                    Cell::Empty
                }
            }
            Cell::Resource => {
                if self.colonize.contains(census.consumer) {
                    Cell::Consumer
                } else if self.deplete.contains(census.consumer) {
                    Cell::Empty
                } else {
                    Cell::Resource
                }
            }
            Cell::Consumer => {
                if census.resource == 0 || census.consumer > self.crowding_limit {
                    Cell::Resource
                } else {
                    Cell::Consumer
                }
            }
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::variant_a()
    }
}

impl From<RuleVariant> for RuleSet {
    fn from(variant: RuleVariant) -> Self {
        match variant {
            RuleVariant::A => Self::variant_a(),
            RuleVariant::B => Self::variant_b(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every census a cell with four neighbors can have
    fn all_censuses() -> Vec<NeighborCensus> {
        let mut out = Vec::new();
        for resource in 0..=4u8 {
            for consumer in 0..=(4 - resource) {
                out.push(NeighborCensus {
                    empty: 4 - resource - consumer,
                    resource,
                    consumer,
                });
            }
        }
        out
    }

    fn table_a(cell: Cell, r: u8, c: u8) -> Cell {
        match cell {
            Cell::Empty if r > 0 && c > 0 => Cell::Consumer,
            Cell::Empty => Cell::Empty,
            Cell::Resource if c > 1 => Cell::Consumer,
            Cell::Resource if c == 1 => Cell::Empty,
            Cell::Resource => Cell::Resource,
            Cell::Consumer if r == 0 || c > 1 => Cell::Resource,
            Cell::Consumer => Cell::Consumer,
        }
    }

    fn table_b(cell: Cell, r: u8, c: u8) -> Cell {
        match cell {
            Cell::Empty if c > 1 => Cell::Consumer,
            Cell::Empty => Cell::Empty,
            Cell::Resource if c > 2 => Cell::Empty,
            Cell::Resource if c > 1 => Cell::Consumer,
            Cell::Resource => Cell::Resource,
            Cell::Consumer if r == 0 || c > 2 => Cell::Resource,
            Cell::Consumer => Cell::Consumer,
        }
    }

    #[test]
    fn test_variant_a_matches_table() {
        let rules = RuleSet::variant_a();
        for census in all_censuses() {
            for cell in Cell::all() {
                assert_eq!(
                    rules.next_state(cell, census),
                    table_a(cell, census.resource, census.consumer),
                    "{:?} with {:?}",
                    cell,
                    census
                );
            }
        }
    }

    #[test]
    fn test_variant_b_matches_table() {
        let rules = RuleSet::variant_b();
        for census in all_censuses() {
            for cell in Cell::all() {
                assert_eq!(
                    rules.next_state(cell, census),
                    table_b(cell, census.resource, census.consumer),
                    "{:?} with {:?}",
                    cell,
                    census
                );
            }
        }
    }

    #[test]
    fn test_isolated_consumer_starves() {
        let census = NeighborCensus {
            empty: 4,
            resource: 0,
            consumer: 0,
        };
        for rules in [RuleSet::variant_a(), RuleSet::variant_b()] {
            assert_eq!(rules.next_state(Cell::Consumer, census), Cell::Resource);
            assert_eq!(rules.next_state(Cell::Empty, census), Cell::Empty);
        }
    }

    #[test]
    fn test_variants_diverge() {
        // One consumer and one resource next to an empty cell
        let census = NeighborCensus {
            empty: 2,
            resource: 1,
            consumer: 1,
        };
        assert_eq!(
            RuleSet::variant_a().next_state(Cell::Empty, census),
            Cell::Consumer
        );
        assert_eq!(
            RuleSet::variant_b().next_state(Cell::Empty, census),
            Cell::Empty
        );
    }

    #[test]
    fn test_from_variant() {
        assert_eq!(RuleSet::from(RuleVariant::A), RuleSet::variant_a());
        assert_eq!(RuleSet::from(RuleVariant::B).variant(), RuleVariant::B);
        assert_eq!(RuleSet::default().variant(), RuleVariant::A);
    }
}
