//! # Overworld Generator
//!
//! Builds the outdoor map: noise-seeded mountain ranges, lakes, forests and
//! clearings grown by diffusion, sandy shores, then caves, buildings and
//! shops placed on open land and joined by roads.

use super::utils::derive_seed;
use super::{
    grow_terrain_passes, paint_border, scatter_seeds, BuildingGenerator, CaveGenerator, GenerationConfig, Generator,
    Growth, Interior,
};
use crate::{
    new_object_id_from_rng, BuildingTile, CaveTile, Coordinate, Environment, Grid, Neighborhood, ObjectId, ObjectKind,
    Pathfinder, PlacedObject, TerraError, TerraResult, TileKind, WorldTile,
};
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Tiles structures may stand on in the overworld.
const STRUCTURE_GROUND: [WorldTile; 3] = [WorldTile::Grass, WorldTile::Sand, WorldTile::Ground];

/// Tiles a road may pave over.
const PAVEABLE: [WorldTile; 3] = [WorldTile::Grass, WorldTile::Sand, WorldTile::Ground];

/// Preferred anchors tried per structure before it is skipped.
const ANCHOR_CANDIDATES: u32 = 8;

/// A generated overworld with the interiors behind its doors.
#[derive(Debug, Clone)]
pub struct World {
    pub overworld: Environment<WorldTile>,
    /// Building floors keyed by the building's object ID
    pub buildings: HashMap<ObjectId, Interior<BuildingTile>>,
    /// Cave levels keyed by the cave's object ID
    pub caves: HashMap<ObjectId, Interior<CaveTile>>,
    /// Road routes, each from one doorstep to the next
    pub roads: Vec<Vec<Coordinate>>,
}

impl World {
    /// Placed structures of one kind, by label ("building", "shop", "cave").
    pub fn structures(&self, label: &str) -> Vec<&PlacedObject> {
        self.overworld
            .static_objects()
            .iter()
            .filter(|object| object.kind.label() == label)
            .collect()
    }
}

/// Generates the overworld and every building and cave interior.
///
/// # Examples
///
/// ```
/// use terrasim::{generation::utils::create_rng, GenerationConfig, Generator, WorldGenerator};
///
/// let config = GenerationConfig::for_testing(3);
/// let generator = WorldGenerator::new();
/// let world = generator.generate(&config, &mut create_rng(&config)).unwrap();
///
/// assert_eq!(world.overworld.grid().width(), config.world_width);
/// assert!(generator.validate(&world, &config).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorldGenerator {
    pathfinder: Pathfinder,
}

impl WorldGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lays down the natural terrain.
    fn shape_terrain(&self, config: &GenerationConfig, rng: &mut StdRng) -> Grid<WorldTile> {
        let mut grid: Grid<WorldTile> = Grid::new(config.world_width, config.world_height);

        let perlin = Perlin::new(rng.gen::<u32>());
        let mut ridges = 0;
        for c in grid.coordinates().collect::<Vec<_>>() {
            let value = perlin.get([
                c.x as f64 * config.mountain_noise_scale,
                c.y as f64 * config.mountain_noise_scale,
            ]);
            if value > config.mountain_noise_threshold {
                grid.set_if_in_bounds(c, WorldTile::Mountain);
                ridges += 1;
            }
        }

        let grass = [WorldTile::Grass];
        let water = scatter_seeds(&mut grid, WorldTile::Water, config.water_seeds, &grass, rng);
        let trees = scatter_seeds(&mut grid, WorldTile::Tree, config.tree_seeds, &grass, rng);
        let clearings = scatter_seeds(&mut grid, WorldTile::Ground, config.ground_seeds, &grass, rng);
        log::debug!(
            "seeded {} mountain, {} water, {} tree, {} ground cells",
            ridges,
            water.len(),
            trees.len(),
            clearings.len()
        );

        let passes = [
            (WorldTile::Mountain, config.mountain_growth_threshold),
            (WorldTile::Water, config.water_growth_threshold),
            (WorldTile::Tree, config.tree_growth_threshold),
            (WorldTile::Ground, config.ground_growth_threshold),
        ];
        for (tile, threshold) in passes {
            let growth = Growth::new(tile, threshold).replacing(&grass);
            let grown = grow_terrain_passes(&mut grid, &growth, config.growth_passes, rng);
            log::trace!("{:?} grew by {}", tile, grown);
        }

        paint_border(
            &mut grid,
            WorldTile::Grass,
            WorldTile::Water,
            WorldTile::Sand,
            Neighborhood::Cardinal,
        );
        grid
    }

    /// Tries several random preferred anchors; returns the final anchor.
    fn place_structure(
        &self,
        overworld: &mut Environment<WorldTile>,
        object: PlacedObject,
        rng: &mut StdRng,
    ) -> Option<Coordinate> {
        let (width, height) = (overworld.grid().width(), overworld.grid().height());
        for _ in 0..ANCHOR_CANDIDATES {
            let preferred = Coordinate::new(rng.gen_range(0..width) as i32, rng.gen_range(0..height) as i32);
            let candidate = PlacedObject {
                position: preferred,
                ..object.clone()
            };
            if let Some(anchor) = overworld.place_static(candidate, Some(&STRUCTURE_GROUND)) {
                // The doorstep shows as road, or as the mouth of a cave.
                let doorstep = match object.kind {
                    ObjectKind::Cave { .. } => WorldTile::Cave,
                    _ => WorldTile::Road,
                };
                let entrance = Coordinate::new(anchor.x, anchor.y + 1);
                overworld.grid_mut().set_if_in_bounds(entrance, doorstep);
                return Some(anchor);
            }
        }
        log::warn!("skipping {} {}: no free site", object.kind.label(), object.id);
        None
    }

    /// Paves A* routes between consecutive doorsteps.
    fn lay_roads(&self, grid: &mut Grid<WorldTile>, doorsteps: &[Coordinate]) -> Vec<Vec<Coordinate>> {
        let mut roads = Vec::new();
        for pair in doorsteps.windows(2) {
            let route = self
                .pathfinder
                .find_path(grid, pair[0], pair[1], WorldTile::MAX_WALKABLE);
            if route.is_empty() {
                log::debug!("no road between {} and {}", pair[0], pair[1]);
                continue;
            }
            for &c in &route {
                if grid.get(c).is_some_and(|tile| PAVEABLE.contains(&tile)) {
                    grid.set_if_in_bounds(c, WorldTile::Road);
                }
            }
            roads.push(route);
        }
        roads
    }
}

impl Generator<World> for WorldGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TerraResult<World> {
        config.validate()?;

        let grid = self.shape_terrain(config, rng);
        let overworld = Environment::new(grid).with_placement(config.placement);
        let interior_seed: u64 = rng.gen();

        let mut requests = Vec::new();
        for _ in 0..config.cave_count {
            let levels = rng.gen_range(1..=config.max_cave_levels);
            requests.push((ObjectKind::Cave { levels }, 2, 2));
        }
        for _ in 0..config.building_count {
            let floors = rng.gen_range(1..=config.max_building_floors);
            requests.push((ObjectKind::Building { floors }, rng.gen_range(4..=6), rng.gen_range(3..=4)));
        }
        for _ in 0..config.shop_count {
            requests.push((ObjectKind::Shop, 3, rng.gen_range(2..=3)));
        }

        let mut world = World {
            overworld,
            buildings: HashMap::new(),
            caves: HashMap::new(),
            roads: Vec::new(),
        };
        let mut doorsteps = Vec::new();

        for (index, (kind, width, height)) in requests.into_iter().enumerate() {
            let object = PlacedObject::new(kind, Coordinate::origin(), width, height)
                .with_id(new_object_id_from_rng(rng));
            let id = object.id;
            let Some(anchor) = self.place_structure(&mut world.overworld, object, rng) else {
                continue;
            };

            let mut interior_rng = StdRng::seed_from_u64(derive_seed(interior_seed, index as u64));
            match world.overworld.object(id).map(|object| object.kind.clone()) {
                Some(ObjectKind::Building { floors }) => {
                    let building = BuildingGenerator::new(floors).generate(config, &mut interior_rng)?;
                    world.buildings.insert(id, building);
                    doorsteps.push(Coordinate::new(anchor.x, anchor.y + 1));
                }
                Some(ObjectKind::Shop) => doorsteps.push(Coordinate::new(anchor.x, anchor.y + 1)),
                Some(ObjectKind::Cave { levels }) => {
                    let cave = CaveGenerator::new(levels).generate(config, &mut interior_rng)?;
                    world.caves.insert(id, cave);
                }
                _ => {}
            }
        }

        if config.lay_roads {
            world.roads = self.lay_roads(world.overworld.grid_mut(), &doorsteps);
        }

        log::debug!(
            "generated {}x{} world: {} buildings, {} caves, {} roads",
            config.world_width,
            config.world_height,
            world.buildings.len(),
            world.caves.len(),
            world.roads.len()
        );
        Ok(world)
    }

    fn validate(&self, content: &World, config: &GenerationConfig) -> TerraResult<()> {
        let grid = content.overworld.grid();
        if grid.width() != config.world_width || grid.height() != config.world_height {
            return Err(TerraError::GenerationFailed(format!(
                "world is {}x{}, expected {}x{}",
                grid.width(),
                grid.height(),
                config.world_width,
                config.world_height
            )));
        }

        let structures = content.overworld.static_objects();
        for (i, a) in structures.iter().enumerate() {
            if let Some(b) = structures[i + 1..]
                .iter()
                .find(|b| crate::utils::math::object_overlaps_at(a, a.position, b))
            {
                return Err(TerraError::GenerationFailed(format!(
                    "{} at {} overlaps {} at {}",
                    a.kind.label(),
                    a.position,
                    b.kind.label(),
                    b.position
                )));
            }
        }

        for object in structures {
            match object.kind {
                ObjectKind::Building { floors } => {
                    let building = content
                        .buildings
                        .get(&object.id)
                        .ok_or(TerraError::ObjectNotFound(object.id))?;
                    BuildingGenerator::new(floors).validate(building, config)?;
                }
                ObjectKind::Cave { levels } => {
                    let cave = content.caves.get(&object.id).ok_or(TerraError::ObjectNotFound(object.id))?;
                    CaveGenerator::new(levels).validate(cave, config)?;
                    if grid.get(object.entrance()) != Some(WorldTile::Cave) {
                        return Err(TerraError::GenerationFailed(format!(
                            "cave at {} has no mouth",
                            object.position
                        )));
                    }
                }
                _ => {}
            }

            let sealed = [object.entrance(), object.approach()]
                .into_iter()
                .filter(|_| object.kind.is_structure())
                .find(|&c| !grid.is_walkable(c, WorldTile::MAX_WALKABLE));
            if let Some(c) = sealed {
                return Err(TerraError::GenerationFailed(format!(
                    "{} at {} is sealed in at {}",
                    object.kind.label(),
                    object.position,
                    c
                )));
            }
        }

        for road in &content.roads {
            if let Some(c) = road.iter().find(|&&c| !grid.is_walkable(c, WorldTile::MAX_WALKABLE)) {
                return Err(TerraError::GenerationFailed(format!("road crosses blocked tile {c}")));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "WorldGenerator"
    }
}
