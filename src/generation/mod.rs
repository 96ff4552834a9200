//! # Generation Module
//!
//! Procedural terrain generation for worlds, building floors and cave levels.
//!
//! This module provides the building blocks (diffusion growth and maze
//! digging) plus the environment factories that combine them with placement
//! and pathfinding. Every generator is deterministic for a given seed.

pub mod growth;
pub mod interiors;
pub mod maze;
pub mod overworld;

pub use growth::*;
pub use interiors::*;
pub use maze::*;
pub use overworld::*;

use crate::{config, PlacementConfig, TerraError, TerraResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for procedural generation.
///
/// Controls world size, how much of each terrain type is seeded and grown,
/// how many structures are placed and how interiors are dug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// World width in tiles
    pub world_width: u32,
    /// World height in tiles
    pub world_height: u32,
    /// Number of lake seed points
    pub water_seeds: u32,
    /// Number of forest seed points
    pub tree_seeds: u32,
    /// Number of bare ground (settlement) seed points
    pub ground_seeds: u32,
    /// Perlin value above which a cell seeds a mountain range
    pub mountain_noise_threshold: f64,
    /// Perlin sampling frequency for mountain seeding
    pub mountain_noise_scale: f64,
    /// Number of growth passes applied per terrain type
    pub growth_passes: u32,
    /// Growth chance threshold for water (higher grows slower)
    pub water_growth_threshold: f64,
    /// Growth chance threshold for trees
    pub tree_growth_threshold: f64,
    /// Growth chance threshold for mountains
    pub mountain_growth_threshold: f64,
    /// Growth chance threshold for bare ground
    pub ground_growth_threshold: f64,
    /// Number of enterable buildings
    pub building_count: u32,
    /// Number of shops
    pub shop_count: u32,
    /// Number of caves
    pub cave_count: u32,
    /// Maximum floors per building
    pub max_building_floors: u32,
    /// Maximum levels per cave
    pub max_cave_levels: u32,
    /// Whether to lay roads between structure entrances
    pub lay_roads: bool,
    /// Maze parameters for building floors
    pub building_maze: MazeConfig,
    /// Maze parameters for cave levels
    pub cave_maze: MazeConfig,
    /// Placement budget and padding
    pub placement: PlacementConfig,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use terrasim::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, 42);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            world_width: config::DEFAULT_WORLD_WIDTH,
            world_height: config::DEFAULT_WORLD_HEIGHT,
            water_seeds: 6,
            tree_seeds: 14,
            ground_seeds: 5,
            mountain_noise_threshold: 0.55,
            mountain_noise_scale: 0.08,
            growth_passes: 4,
            water_growth_threshold: 0.6,
            tree_growth_threshold: 0.7,
            mountain_growth_threshold: 0.8,
            ground_growth_threshold: 0.45,
            building_count: 4,
            shop_count: 2,
            cave_count: 2,
            max_building_floors: 3,
            max_cave_levels: 3,
            lay_roads: true,
            building_maze: MazeConfig::building(
                config::DEFAULT_INTERIOR_WIDTH,
                config::DEFAULT_INTERIOR_HEIGHT,
            ),
            cave_maze: MazeConfig::cave(
                config::DEFAULT_INTERIOR_WIDTH,
                config::DEFAULT_INTERIOR_HEIGHT,
            ),
            placement: PlacementConfig::default(),
        }
    }

    /// Creates a configuration for testing with smaller, simpler environments.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            world_width: 48,
            world_height: 32,
            water_seeds: 2,
            tree_seeds: 4,
            ground_seeds: 3,
            growth_passes: 2,
            building_count: 2,
            shop_count: 1,
            cave_count: 1,
            max_building_floors: 2,
            max_cave_levels: 2,
            building_maze: MazeConfig::building(24, 18),
            cave_maze: MazeConfig::cave(24, 18),
            ..Self::new(seed)
        }
    }

    /// Loads a configuration from a JSON file; missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> TerraResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration values are consistent.
    pub fn validate(&self) -> TerraResult<()> {
        if self.world_width < 8 || self.world_height < 8 {
            return Err(TerraError::InvalidConfig(format!(
                "world must be at least 8x8, got {}x{}",
                self.world_width, self.world_height
            )));
        }

        let thresholds = [
            ("water_growth_threshold", self.water_growth_threshold),
            ("tree_growth_threshold", self.tree_growth_threshold),
            ("mountain_growth_threshold", self.mountain_growth_threshold),
            ("ground_growth_threshold", self.ground_growth_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(TerraError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }

        if self.max_building_floors == 0 || self.max_cave_levels == 0 {
            return Err(TerraError::InvalidConfig(
                "buildings and caves need at least one floor/level".to_string(),
            ));
        }

        self.building_maze.validate()?;
        self.cave_maze.validate()?;
        self.placement.validate()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// All environment factories implement this trait so hosts can drive them
/// uniformly and validate what they produce.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TerraResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> TerraResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Derives an independent, reproducible seed for a sub-generator.
    ///
    /// Uses the SplitMix64 finaliser so neighbouring salts give unrelated streams.
    pub fn derive_seed(seed: u64, salt: u64) -> u64 {
        let mut z = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::io::Write;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing(1).validate().is_ok());
        assert_eq!(GenerationConfig::default().seed, 42);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = GenerationConfig::new(1);
        config.tree_growth_threshold = 1.5;
        assert!(matches!(config.validate(), Err(TerraError::InvalidConfig(_))));

        let mut config = GenerationConfig::new(1);
        config.world_width = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_json_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 7, "building_count": 9}}"#).unwrap();

        let config = GenerationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.building_count, 9);
        assert_eq!(config.world_width, GenerationConfig::default().world_width);
    }

    #[test]
    fn test_config_from_bad_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            GenerationConfig::from_json_file(file.path()),
            Err(TerraError::Serde(_))
        ));
        assert!(matches!(
            GenerationConfig::from_json_file("/definitely/missing.json"),
            Err(TerraError::Io(_))
        ));
    }

    #[test]
    fn test_utils_rng_is_reproducible() {
        let config = GenerationConfig::new(12345);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_seed() {
        assert_eq!(utils::derive_seed(1, 2), utils::derive_seed(1, 2));
        assert_ne!(utils::derive_seed(1, 2), utils::derive_seed(1, 3));
        assert_ne!(utils::derive_seed(1, 2), utils::derive_seed(2, 2));
    }
}
