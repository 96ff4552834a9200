//! # Diffusion Growth
//!
//! Probabilistic neighbour promotion used to grow organic regions (lakes,
//! forests, mountain ranges) out of seed points. One call is one pass;
//! callers repeat it to enlarge regions.

use crate::utils::math::roll_exceeds;
use crate::{config, Coordinate, Grid, Neighborhood, TileKind};
use rand::Rng;

/// Parameters for one growth pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Growth<T> {
    /// Tile type being grown
    pub target: T,
    /// A neighbour is promoted when a uniform draw exceeds this value
    pub chance_threshold: f64,
    /// Neighbourhood radius around each source cell (1 = 3x3)
    pub radius: u32,
    /// Tiles that may be overwritten; `None` means any tile
    pub replaceable: Option<Vec<T>>,
}

impl<T: TileKind> Growth<T> {
    /// Creates a 3x3 growth pass that may overwrite anything.
    pub fn new(target: T, chance_threshold: f64) -> Self {
        Self {
            target,
            chance_threshold,
            radius: config::GROWTH_RADIUS,
            replaceable: None,
        }
    }

    /// Sets the neighbourhood radius.
    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Restricts which tiles the growth may overwrite.
    pub fn replacing(mut self, tiles: &[T]) -> Self {
        self.replaceable = Some(tiles.to_vec());
        self
    }

    fn can_replace(&self, tile: T) -> bool {
        tile != self.target
            && self
                .replaceable
                .as_ref()
                .map_or(true, |allowed| allowed.contains(&tile))
    }
}

/// Runs one growth pass and returns how many cells were promoted.
///
/// Source cells are the cells holding `growth.target` when the pass starts,
/// so cells promoted during this pass do not spread until the next one. The
/// target count never decreases.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use terrasim::{grow_terrain, Coordinate, Grid, Growth, WorldTile};
///
/// let mut grid: Grid<WorldTile> = Grid::new(9, 9);
/// grid.set(Coordinate::new(4, 4), WorldTile::Water).unwrap();
/// let mut rng = StdRng::seed_from_u64(3);
///
/// // A threshold below zero always promotes: the full 3x3 block turns to water.
/// let promoted = grow_terrain(&mut grid, &Growth::new(WorldTile::Water, -1.0), &mut rng);
/// assert_eq!(promoted, 8);
/// assert_eq!(grid.count(WorldTile::Water), 9);
/// ```
pub fn grow_terrain<T, R>(grid: &mut Grid<T>, growth: &Growth<T>, rng: &mut R) -> usize
where
    T: TileKind,
    R: Rng + ?Sized,
{
    let sources: Vec<Coordinate> = grid
        .coordinates()
        .filter(|&c| grid.get(c) == Some(growth.target))
        .collect();

    let radius = growth.radius as i32;
    let mut promoted = 0;

    for source in sources {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let neighbor = Coordinate::new(source.x + dx, source.y + dy);
                let Some(tile) = grid.get(neighbor) else {
                    continue;
                };
                if !growth.can_replace(tile) {
                    continue;
                }
                if roll_exceeds(rng, growth.chance_threshold) && grid.set_if_in_bounds(neighbor, growth.target) {
                    promoted += 1;
                }
            }
        }
    }

    log::trace!(
        "growth pass for {:?}: {} cells promoted",
        growth.target,
        promoted
    );
    promoted
}

/// Repeats [`grow_terrain`] `passes` times; returns the total promoted.
pub fn grow_terrain_passes<T, R>(grid: &mut Grid<T>, growth: &Growth<T>, passes: u32, rng: &mut R) -> usize
where
    T: TileKind,
    R: Rng + ?Sized,
{
    (0..passes).map(|_| grow_terrain(grid, growth, rng)).sum()
}

/// Drops up to `count` single-cell seeds of `tile` at random positions.
///
/// Seeds only land on `replaceable` tiles; each seed gets a bounded number of
/// position draws so a crowded grid yields fewer seeds instead of looping.
pub fn scatter_seeds<T, R>(grid: &mut Grid<T>, tile: T, count: u32, replaceable: &[T], rng: &mut R) -> Vec<Coordinate>
where
    T: TileKind,
    R: Rng + ?Sized,
{
    const DRAWS_PER_SEED: u32 = 16;

    let mut seeds = Vec::new();
    if grid.is_empty() {
        return seeds;
    }

    for _ in 0..count {
        for _ in 0..DRAWS_PER_SEED {
            let c = Coordinate::new(
                rng.gen_range(0..grid.width()) as i32,
                rng.gen_range(0..grid.height()) as i32,
            );
            if grid.get(c).is_some_and(|current| replaceable.contains(&current)) {
                grid.set_if_in_bounds(c, tile);
                seeds.push(c);
                break;
            }
        }
    }
    seeds
}

/// Converts every `source` tile touching an `around` tile into `paint`.
///
/// Used for shorelines: grass next to water becomes sand. Adjacency is read
/// from the grid as it was before the pass.
pub fn paint_border<T: TileKind>(
    grid: &mut Grid<T>,
    source: T,
    around: T,
    paint: T,
    neighborhood: Neighborhood,
) -> usize {
    let targets: Vec<Coordinate> = grid
        .coordinates()
        .filter(|&c| grid.get(c) == Some(source) && grid.has_neighbor(c, around, neighborhood))
        .collect();

    for &c in &targets {
        grid.set_if_in_bounds(c, paint);
    }
    targets.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorldTile;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_growth_never_shrinks_target() {
        let mut grid: Grid<WorldTile> = Grid::new(20, 20);
        let mut rng = StdRng::seed_from_u64(11);
        scatter_seeds(&mut grid, WorldTile::Tree, 5, &[WorldTile::Grass], &mut rng);

        let growth = Growth::new(WorldTile::Tree, 0.5);
        let mut previous = grid.count(WorldTile::Tree);
        for _ in 0..5 {
            let promoted = grow_terrain(&mut grid, &growth, &mut rng);
            let now = grid.count(WorldTile::Tree);
            assert_eq!(now, previous + promoted);
            previous = now;
        }
    }

    #[test]
    fn test_threshold_one_never_promotes() {
        let mut grid: Grid<WorldTile> = Grid::new(5, 5);
        grid.set(Coordinate::new(2, 2), WorldTile::Water).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(grow_terrain(&mut grid, &Growth::new(WorldTile::Water, 1.0), &mut rng), 0);
        assert_eq!(grid.count(WorldTile::Water), 1);
    }

    #[test]
    fn test_single_pass_does_not_chain() {
        let mut grid: Grid<WorldTile> = Grid::new(7, 1);
        grid.set(Coordinate::new(0, 0), WorldTile::Water).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        grow_terrain(&mut grid, &Growth::new(WorldTile::Water, -1.0), &mut rng);
        assert_eq!(grid.count(WorldTile::Water), 2);
    }

    #[test]
    fn test_radius_widens_neighbourhood() {
        let mut grid: Grid<WorldTile> = Grid::new(9, 9);
        grid.set(Coordinate::new(4, 4), WorldTile::Mountain).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let growth = Growth::new(WorldTile::Mountain, -1.0).radius(2);
        assert_eq!(grow_terrain(&mut grid, &growth, &mut rng), 24);
    }

    #[test]
    fn test_replaceable_restricts_growth() {
        let mut grid: Grid<WorldTile> = Grid::new(3, 3);
        grid.set(Coordinate::new(1, 1), WorldTile::Tree).unwrap();
        grid.set(Coordinate::new(0, 0), WorldTile::Water).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let growth = Growth::new(WorldTile::Tree, -1.0).replacing(&[WorldTile::Grass]);
        grow_terrain(&mut grid, &growth, &mut rng);
        assert_eq!(grid.get(Coordinate::new(0, 0)), Some(WorldTile::Water));
        assert_eq!(grid.count(WorldTile::Tree), 8);
    }

    #[test]
    fn test_growth_is_deterministic_for_seed() {
        let run = |seed| {
            let mut grid: Grid<WorldTile> = Grid::new(16, 16);
            let mut rng = StdRng::seed_from_u64(seed);
            scatter_seeds(&mut grid, WorldTile::Water, 3, &[WorldTile::Grass], &mut rng);
            grow_terrain_passes(&mut grid, &Growth::new(WorldTile::Water, 0.6), 3, &mut rng);
            grid
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_paint_border() {
        let mut grid: Grid<WorldTile> = Grid::new(5, 1);
        grid.set(Coordinate::new(2, 0), WorldTile::Water).unwrap();
        let painted = paint_border(
            &mut grid,
            WorldTile::Grass,
            WorldTile::Water,
            WorldTile::Sand,
            Neighborhood::Cardinal,
        );
        assert_eq!(painted, 2);
        assert_eq!(grid.get(Coordinate::new(1, 0)), Some(WorldTile::Sand));
        assert_eq!(grid.get(Coordinate::new(3, 0)), Some(WorldTile::Sand));
        assert_eq!(grid.get(Coordinate::new(0, 0)), Some(WorldTile::Grass));
    }
}
