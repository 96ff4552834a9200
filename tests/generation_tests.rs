//! Integration tests for terrain growth, maze digging and the environment factories

use rand::rngs::StdRng;
use rand::SeedableRng;
use terrasim::{
    generate_maze, grow_terrain, scatter_seeds, BuildingGenerator, BuildingTile, CaveGenerator, CaveTile, Coordinate,
    GenerationConfig, Generator, Grid, Growth, MazeConfig, Neighborhood, TerraResult, TileKind, WorldGenerator, WorldTile,
};

#[test]
fn test_growth_is_monotonic_over_many_passes() {
    let mut grid: Grid<WorldTile> = Grid::new(32, 32);
    let mut rng = StdRng::seed_from_u64(2024);
    scatter_seeds(&mut grid, WorldTile::Water, 4, &[WorldTile::Grass], &mut rng);

    let growth = Growth::new(WorldTile::Water, 0.65);
    let mut last = grid.count(WorldTile::Water);
    for _ in 0..10 {
        grow_terrain(&mut grid, &growth, &mut rng);
        let now = grid.count(WorldTile::Water);
        assert!(now >= last);
        last = now;
    }
}

#[test]
fn test_maze_respects_dug_percentage() -> TerraResult<()> {
    for seed in 0..10 {
        let config = MazeConfig::building(30, 20);
        let maze = generate_maze::<BuildingTile, _>(&config, &mut StdRng::seed_from_u64(seed))?;
        assert!(maze.dug_tiles <= config.max_dug_tiles());
        assert_eq!(maze.grid.count(BuildingTile::Ground), maze.dug_tiles);
    }
    Ok(())
}

#[test]
fn test_maze_floor_never_leaks() -> TerraResult<()> {
    let config = MazeConfig::cave(36, 24);
    let maze = generate_maze::<CaveTile, _>(&config, &mut StdRng::seed_from_u64(31))?;
    let grid = &maze.grid;

    for c in grid.coordinates() {
        if grid.get(c) != Some(CaveTile::Ground) {
            continue;
        }
        assert!(!grid.has_neighbor(c, CaveTile::Nothing, Neighborhood::Moore), "{c} leaks");
        let on_border = c.x == 0 || c.y == 0 || c.x == grid.width() as i32 - 1 || c.y == grid.height() as i32 - 1;
        assert!(!on_border, "{c} on border");
    }
    Ok(())
}

#[test]
fn test_maze_floor_is_connected() -> TerraResult<()> {
    let config = MazeConfig::building(40, 30);
    let maze = generate_maze::<BuildingTile, _>(&config, &mut StdRng::seed_from_u64(8))?;
    let start = maze.floor_tiles()[0];
    let reachable = maze.grid.reachable_from(start, BuildingTile::MAX_WALKABLE);
    assert_eq!(reachable.len(), maze.dug_tiles);
    Ok(())
}

#[test]
fn test_world_factory_produces_valid_worlds() -> TerraResult<()> {
    let generator = WorldGenerator::new();
    for seed in [1, 17, 99] {
        let config = GenerationConfig::for_testing(seed);
        let world = generator.generate(&config, &mut StdRng::seed_from_u64(seed))?;
        generator.validate(&world, &config)?;

        for building in world.buildings.values() {
            let stairs: usize = building.levels.iter().map(|l| l.grid().count(BuildingTile::Stairs)).sum();
            assert_eq!(stairs, 2 * building.links.len());
        }
    }
    Ok(())
}

#[test]
fn test_every_doorway_leads_outside() -> TerraResult<()> {
    let generator = WorldGenerator::new();
    for seed in 0..16 {
        let config = GenerationConfig::for_testing(seed);
        let world = generator.generate(&config, &mut StdRng::seed_from_u64(seed))?;
        generator.validate(&world, &config)?;

        let grid = world.overworld.grid();
        for structure in world.overworld.static_objects() {
            let outside: Vec<Coordinate> = structure
                .entrance()
                .cardinal_adjacent_coordinates()
                .into_iter()
                .filter(|&c| !structure.covers(c) && grid.is_walkable(c, WorldTile::MAX_WALKABLE))
                .collect();
            assert!(!outside.is_empty(), "seed {seed}: {} at {} sealed", structure.kind.label(), structure.position);

            let reachable = grid.reachable_from(structure.entrance(), WorldTile::MAX_WALKABLE);
            assert!(reachable.contains(&structure.approach()));
        }
    }
    Ok(())
}

#[test]
fn test_factories_report_their_type() {
    assert_eq!(WorldGenerator::new().generator_type(), "WorldGenerator");
    assert_eq!(BuildingGenerator::new(1).generator_type(), "BuildingGenerator");
    assert_eq!(CaveGenerator::new(1).generator_type(), "CaveGenerator");
}

#[test]
fn test_cave_entry_connects_to_deepest_level() -> TerraResult<()> {
    let config = GenerationConfig::for_testing(55);
    let generator = CaveGenerator::new(3);
    let cave = generator.generate(&config, &mut StdRng::seed_from_u64(55))?;

    // Walk level by level: entry -> link -> link.
    let mut from = cave.entry;
    for (level, link) in cave.links.iter().enumerate() {
        let reachable = cave.levels[level].grid().reachable_from(from, CaveTile::Tunnel as u8);
        assert!(reachable.contains(&link.position));
        from = link.position;
    }
    assert_eq!(from, cave.links.last().unwrap().position);
    assert_eq!(cave.levels[2].grid().get(from), Some(CaveTile::Tunnel));
    assert!(cave.levels[0].grid().get(Coordinate::new(0, 0)) != Some(CaveTile::Ground));
    Ok(())
}
