//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::SeedDistribution;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Selects one of the two shipped rule tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleVariant {
    /// Neighbor threshold "any": one neighbor of a kind is enough to react
    #[default]
    A,
    /// Neighbor threshold "majority": thresholds shifted up by one
    B,
}

impl RuleVariant {
    /// Seeding distribution shipped with this variant
    pub fn seed_distribution(&self) -> SeedDistribution {
        match self {
            RuleVariant::A => SeedDistribution {
                empty: 0.7,
                resource: 0.2,
                consumer: 0.1,
            },
            RuleVariant::B => SeedDistribution {
                empty: 0.5,
                resource: 0.3,
                consumer: 0.2,
            },
        }
    }
}

impl fmt::Display for RuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleVariant::A => write!(f, "a"),
            RuleVariant::B => write!(f, "b"),
        }
    }
}

impl FromStr for RuleVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "any" => Ok(RuleVariant::A),
            "b" | "majority" => Ok(RuleVariant::B),
            other => Err(Error::InvalidConfig(format!(
                "unknown rule variant '{}' (expected 'a' or 'b')",
                other
            ))),
        }
    }
}

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the square grid
    pub size: usize,
    /// Rule table to apply each generation
    pub variant: RuleVariant,
    /// Seeding distribution; `None` uses the variant's preset
    pub seed_distribution: Option<SeedDistribution>,
}

impl WorldConfig {
    pub fn seed_distribution(&self) -> SeedDistribution {
        self.seed_distribution
            .unwrap_or_else(|| self.variant.seed_distribution())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: 100,
            variant: RuleVariant::A,
            seed_distribution: None,
        }
    }
}

/// Simulation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of generations to compute; 0 means unbounded for drivers that
    /// support it
    pub num_frames: u64,
    /// Random seed for reproducible initial grids
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Compute rows in parallel
    pub parallel: bool,
    /// Number of recent generations fingerprinted for cycle detection
    pub cycle_window: usize,
    /// End `run` early once a generation repeats
    pub stop_on_cycle: bool,
    /// Generations between population metric snapshots
    pub metrics_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_frames: 10,
            seed: 0,
            world: WorldConfig::default(),
            parallel: false,
            cycle_window: 10,
            stop_on_cycle: false,
            metrics_interval: 100,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.size < 1 {
            return Err(Error::InvalidSize(self.world.size));
        }
        self.world.seed_distribution().validate()?;
        if self.cycle_window < 1 {
            return Err(Error::InvalidConfig(
                "cycle_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Frame driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Delay between frames (milliseconds)
    pub interval_ms: u64,
    /// Smallest grid size accepted from the command line
    pub min_grid_size: usize,
    /// Size used when none (or a too-small one) is requested
    pub default_grid_size: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            min_grid_size: 9,
            default_grid_size: 100,
        }
    }
}

impl DriverConfig {
    /// Pick the grid size for a run. Requests below `min_grid_size` fall back
    /// to `default_grid_size`.
    pub fn resolve_grid_size(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(size) if size >= self.min_grid_size => size,
            Some(size) => {
                warn!(
                    requested = size,
                    min = self.min_grid_size,
                    fallback = self.default_grid_size,
                    "Grid size too small, using default"
                );
                self.default_grid_size
            }
            None => self.default_grid_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let world = WorldConfig::default();
        assert_eq!(world.size, 100);
        assert_eq!(world.variant, RuleVariant::A);

        let sim = SimulationConfig::default();
        assert_eq!(sim.num_frames, 10);
        assert!(sim.validate().is_ok());

        let driver = DriverConfig::default();
        assert_eq!(driver.interval_ms, 50);
    }

    #[test]
    fn test_variant_presets_are_valid() {
        for variant in [RuleVariant::A, RuleVariant::B] {
            assert!(variant.seed_distribution().validate().is_ok());
        }
        let a = RuleVariant::A.seed_distribution();
        assert_eq!((a.empty, a.resource, a.consumer), (0.7, 0.2, 0.1));
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("A".parse::<RuleVariant>().unwrap(), RuleVariant::A);
        assert_eq!("majority".parse::<RuleVariant>().unwrap(), RuleVariant::B);
        assert!("c".parse::<RuleVariant>().is_err());
    }

    #[test]
    fn test_resolve_grid_size() {
        let driver = DriverConfig::default();
        assert_eq!(driver.resolve_grid_size(None), 100);
        assert_eq!(driver.resolve_grid_size(Some(8)), 100);
        assert_eq!(driver.resolve_grid_size(Some(9)), 9);
        assert_eq!(driver.resolve_grid_size(Some(250)), 250);
    }

    #[test]
    fn test_partial_json_config() {
        let config = SimulationConfig::from_json_str(
            r#"{ "num_frames": 25, "world": { "size": 16, "variant": "b" } }"#,
        )
        .unwrap();
        assert_eq!(config.num_frames, 25);
        assert_eq!(config.world.size, 16);
        assert_eq!(config.world.variant, RuleVariant::B);
        assert_eq!(config.cycle_window, 10);
        assert_eq!(
            config.world.seed_distribution(),
            RuleVariant::B.seed_distribution()
        );
    }

    #[test]
    fn test_invalid_json_config() {
        let err = SimulationConfig::from_json_str(r#"{ "world": { "size": 0 } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidSize(0)));

        let err = SimulationConfig::from_json_str(
            r#"{ "world": { "seed_distribution": { "empty": 0.5, "resource": 0.5, "consumer": 0.5 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDistribution(_)));

        let err = SimulationConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
