//! # Interior Generators
//!
//! Multi-level interiors: building floors joined by stairs and cave levels
//! joined by tunnels. Every level is a dug maze; consecutive levels share a
//! link tile at the same coordinate so a character keeps its position when
//! changing level.

use super::utils::derive_seed;
use super::{generate_maze, GenerationConfig, Generator, MazeConfig};
use crate::{BuildingTile, CaveTile, Coordinate, Environment, MazeTiles, TerraError, TerraResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Shared tile between level `from` and level `from + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLink {
    pub from: usize,
    pub to: usize,
    pub position: Coordinate,
}

/// A stack of levels with their links.
#[derive(Debug, Clone)]
pub struct Interior<T: MazeTiles> {
    /// Levels in order: ground floor first, or cave mouth first
    pub levels: Vec<Environment<T>>,
    /// Where a character arriving from the overworld appears on level 0
    pub entry: Coordinate,
    pub links: Vec<LevelLink>,
}

impl<T: MazeTiles> Interior<T> {
    /// Link tiles on a given level, in either direction.
    pub fn links_on(&self, level: usize) -> impl Iterator<Item = Coordinate> + '_ {
        self.links
            .iter()
            .filter(move |link| link.from == level || link.to == level)
            .map(|link| link.position)
    }
}

/// Generates the floors of a building.
///
/// # Examples
///
/// ```
/// use terrasim::{generation::utils::create_rng, BuildingGenerator, BuildingTile, GenerationConfig, Generator};
///
/// let config = GenerationConfig::for_testing(8);
/// let generator = BuildingGenerator::new(3);
/// let building = generator.generate(&config, &mut create_rng(&config)).unwrap();
///
/// assert_eq!(building.levels.len(), 3);
/// let stairs = building.links[0].position;
/// assert_eq!(building.levels[0].grid().get(stairs), Some(BuildingTile::Stairs));
/// assert_eq!(building.levels[1].grid().get(stairs), Some(BuildingTile::Stairs));
/// ```
#[derive(Debug, Clone)]
pub struct BuildingGenerator {
    pub floors: u32,
}

impl BuildingGenerator {
    pub fn new(floors: u32) -> Self {
        Self { floors }
    }
}

impl Generator<Interior<BuildingTile>> for BuildingGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TerraResult<Interior<BuildingTile>> {
        dig_interior(config, &config.building_maze, self.floors, BuildingTile::Stairs, None, rng)
    }

    fn validate(&self, content: &Interior<BuildingTile>, _config: &GenerationConfig) -> TerraResult<()> {
        validate_interior(content, self.floors, BuildingTile::Stairs)
    }

    fn generator_type(&self) -> &'static str {
        "BuildingGenerator"
    }
}

/// Generates the levels of a cave. Level 0's entry is a tunnel tile back
/// to the overworld.
#[derive(Debug, Clone)]
pub struct CaveGenerator {
    pub levels: u32,
}

impl CaveGenerator {
    pub fn new(levels: u32) -> Self {
        Self { levels }
    }
}

impl Generator<Interior<CaveTile>> for CaveGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TerraResult<Interior<CaveTile>> {
        dig_interior(
            config,
            &config.cave_maze,
            self.levels,
            CaveTile::Tunnel,
            Some(CaveTile::Tunnel),
            rng,
        )
    }

    fn validate(&self, content: &Interior<CaveTile>, _config: &GenerationConfig) -> TerraResult<()> {
        validate_interior(content, self.levels, CaveTile::Tunnel)?;
        match content.levels[0].grid().get(content.entry) {
            Some(CaveTile::Tunnel) => Ok(()),
            other => Err(TerraError::GenerationFailed(format!(
                "cave entry {} is {:?}, not a tunnel",
                content.entry, other
            ))),
        }
    }

    fn generator_type(&self) -> &'static str {
        "CaveGenerator"
    }
}

fn dig_interior<T: MazeTiles>(
    config: &GenerationConfig,
    maze: &MazeConfig,
    count: u32,
    link_tile: T,
    entry_tile: Option<T>,
    rng: &mut StdRng,
) -> TerraResult<Interior<T>> {
    if count == 0 {
        return Err(TerraError::InvalidConfig(
            "an interior needs at least one level".to_string(),
        ));
    }

    let base_seed: u64 = rng.gen();
    let mut levels = Vec::with_capacity(count as usize);
    let mut entry = None;

    for level in 0..count {
        let mut level_rng = StdRng::seed_from_u64(derive_seed(base_seed, level as u64));
        let dug = generate_maze::<T, _>(maze, &mut level_rng)?;
        if level == 0 {
            entry = dug.features.first().map(|room| room.center());
        }
        levels.push(Environment::new(dug.grid).with_placement(config.placement));
    }

    let entry = entry.ok_or_else(|| {
        TerraError::GenerationFailed(format!("{}x{} maze dug no floor", maze.width, maze.height))
    })?;
    if let Some(tile) = entry_tile {
        levels[0].grid_mut().set(entry, tile)?;
    }

    let mut links = Vec::with_capacity(levels.len().saturating_sub(1));
    for from in 0..levels.len().saturating_sub(1) {
        let (upper, lower) = (&levels[from], &levels[from + 1]);
        let shared: Vec<Coordinate> = upper
            .grid()
            .coordinates()
            .filter(|&c| {
                c != entry && upper.grid().get(c) == Some(T::ground()) && lower.grid().get(c) == Some(T::ground())
            })
            .collect();

        if shared.is_empty() {
            return Err(TerraError::GenerationFailed(format!(
                "levels {} and {} share no floor tile",
                from,
                from + 1
            )));
        }

        let position = shared[rng.gen_range(0..shared.len())];
        levels[from].grid_mut().set(position, link_tile)?;
        levels[from + 1].grid_mut().set(position, link_tile)?;
        links.push(LevelLink { from, to: from + 1, position });
    }

    log::debug!(
        "dug {} {:?} levels, entry at {}",
        levels.len(),
        T::GRID_KIND,
        entry
    );

    Ok(Interior { levels, entry, links })
}

/// Checks level count, link tiles and that every level's entry and links
/// are mutually reachable.
fn validate_interior<T: MazeTiles>(interior: &Interior<T>, count: u32, link_tile: T) -> TerraResult<()> {
    if interior.levels.len() != count as usize {
        return Err(TerraError::GenerationFailed(format!(
            "expected {} levels, got {}",
            count,
            interior.levels.len()
        )));
    }

    for link in &interior.links {
        for level in [link.from, link.to] {
            let tile = interior.levels.get(level).and_then(|env| env.grid().get(link.position));
            if tile != Some(link_tile) {
                return Err(TerraError::GenerationFailed(format!(
                    "link at {} on level {} is {:?}",
                    link.position, level, tile
                )));
            }
        }
    }

    for (index, level) in interior.levels.iter().enumerate() {
        let mut anchors: Vec<Coordinate> = interior.links_on(index).collect();
        if index == 0 {
            anchors.push(interior.entry);
        }
        let Some(&first) = anchors.first() else {
            continue;
        };
        let reachable = level.grid().reachable_from(first, T::MAX_WALKABLE);
        if let Some(cut_off) = anchors.iter().find(|c| !reachable.contains(c)) {
            return Err(TerraError::GenerationFailed(format!(
                "{} on level {} is unreachable from {}",
                cut_off, index, first
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;

    #[test]
    fn test_building_floors_share_stairs() {
        let config = GenerationConfig::for_testing(21);
        let generator = BuildingGenerator::new(3);
        let building = generator.generate(&config, &mut create_rng(&config)).unwrap();

        assert_eq!(building.levels.len(), 3);
        assert_eq!(building.links.len(), 2);
        assert!(generator.validate(&building, &config).is_ok());
        for link in &building.links {
            assert_eq!(link.to, link.from + 1);
        }
        assert_eq!(building.levels[0].grid().get(building.entry), Some(BuildingTile::Ground));
    }

    #[test]
    fn test_single_level_has_no_links() {
        let config = GenerationConfig::for_testing(2);
        let cave = CaveGenerator::new(1).generate(&config, &mut create_rng(&config)).unwrap();
        assert!(cave.links.is_empty());
        assert_eq!(cave.levels[0].grid().get(cave.entry), Some(CaveTile::Tunnel));
    }

    #[test]
    fn test_cave_levels_are_valid() {
        for seed in 0..5 {
            let config = GenerationConfig::for_testing(seed);
            let generator = CaveGenerator::new(3);
            let cave = generator.generate(&config, &mut create_rng(&config)).unwrap();
            assert!(generator.validate(&cave, &config).is_ok(), "seed {seed}");
            assert_eq!(cave.levels[1].grid().count(CaveTile::Tunnel), 2);
        }
    }

    #[test]
    fn test_interiors_are_deterministic() {
        let config = GenerationConfig::for_testing(77);
        let generator = BuildingGenerator::new(2);
        let a = generator.generate(&config, &mut create_rng(&config)).unwrap();
        let b = generator.generate(&config, &mut create_rng(&config)).unwrap();
        assert_eq!(a.entry, b.entry);
        assert_eq!(a.links, b.links);
        assert_eq!(a.levels[1].grid(), b.levels[1].grid());
    }

    #[test]
    fn test_zero_levels_rejected() {
        let config = GenerationConfig::for_testing(1);
        let result = CaveGenerator::new(0).generate(&config, &mut create_rng(&config));
        assert!(matches!(result, Err(TerraError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_detects_broken_link() {
        let config = GenerationConfig::for_testing(5);
        let generator = BuildingGenerator::new(2);
        let mut building = generator.generate(&config, &mut create_rng(&config)).unwrap();
        let stairs = building.links[0].position;
        building.levels[1].grid_mut().set(stairs, BuildingTile::Ground).unwrap();
        assert!(generator.validate(&building, &config).is_err());
    }
}
