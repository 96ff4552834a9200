//! # Pathfinding Algorithms
//!
//! A* search over a terrain grid for character movement.
//!
//! Movement is 4-directional with unit step cost and a Manhattan heuristic by
//! default, which makes the returned route optimal. Diagonal steps and other
//! heuristics are opt-in through [`PathOptions`].
//!
//! Paths run from the start tile to the target tile, both inclusive. An empty
//! path means "no route"; it is a normal outcome, not an error.

use crate::{Coordinate, Direction, Grid, TileKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Cost of one cardinal step, scaled so diagonal costs stay integral.
const CARDINAL_COST: u32 = 10;
/// Cost of one diagonal step (about sqrt(2) cardinal steps).
const DIAGONAL_COST: u32 = 14;

/// Distance estimate used to order the open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    /// Sum of axis distances. Exact for cardinal-only movement.
    Manhattan,
    /// Diagonal distance matching the diagonal step cost.
    Octile,
    /// Straight-line distance.
    Euclidean,
}

impl Heuristic {
    /// Scaled estimate between two coordinates.
    fn estimate(self, from: Coordinate, to: Coordinate) -> u32 {
        match self {
            Heuristic::Manhattan => CARDINAL_COST * from.manhattan_distance(to),
            Heuristic::Octile => {
                let dx = from.x.abs_diff(to.x);
                let dy = from.y.abs_diff(to.y);
                CARDINAL_COST * dx.max(dy) + (DIAGONAL_COST - CARDINAL_COST) * dx.min(dy)
            }
            Heuristic::Euclidean => (CARDINAL_COST as f64 * from.euclidean_distance(to)).floor() as u32,
        }
    }
}

/// Tunable search behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOptions {
    /// Allow diagonal steps (never cutting a blocked corner).
    pub diagonal: bool,
    /// Heuristic used for the `f = g + h` ordering.
    pub heuristic: Heuristic,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            diagonal: false,
            heuristic: Heuristic::Manhattan,
        }
    }
}

impl PathOptions {
    /// Eight-way movement with the matching octile heuristic.
    pub fn diagonal() -> Self {
        Self {
            diagonal: true,
            heuristic: Heuristic::Octile,
        }
    }
}

/// Open-set entry for A* search.
#[derive(Debug, Clone)]
struct OpenNode {
    f_score: u32,
    /// Insertion counter; earlier entries win ties on `f_score`.
    order: u64,
    index: usize,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score && self.order == other.order
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior in BinaryHeap
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// A* grid pathfinder.
///
/// # Examples
///
/// ```
/// use terrasim::{BuildingTile, Coordinate, Grid, Pathfinder, TileKind};
///
/// let grid: Grid<BuildingTile> = Grid::filled(5, 5, BuildingTile::Ground);
/// let path = Pathfinder::new().find_path(
///     &grid,
///     Coordinate::new(0, 0),
///     Coordinate::new(4, 4),
///     BuildingTile::MAX_WALKABLE,
/// );
/// assert_eq!(path.len(), 9);
/// assert_eq!(path.first(), Some(&Coordinate::new(0, 0)));
/// assert_eq!(path.last(), Some(&Coordinate::new(4, 4)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    pub options: PathOptions,
}

impl Pathfinder {
    /// Creates a pathfinder with cardinal movement and a Manhattan heuristic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pathfinder with explicit options.
    pub fn with_options(options: PathOptions) -> Self {
        Self { options }
    }

    /// Finds a route whose every tile value is at most `max_walkable`.
    pub fn find_path<T: TileKind>(
        &self,
        grid: &Grid<T>,
        start: Coordinate,
        target: Coordinate,
        max_walkable: u8,
    ) -> Vec<Coordinate> {
        self.find_path_avoiding(grid, start, target, max_walkable, |_| false)
    }

    /// Finds a route that additionally avoids every tile `blocked` reports.
    ///
    /// The target tile is exempt from `blocked` so callers can path towards an
    /// occupied destination and stop short of it.
    pub fn find_path_avoiding<T, F>(
        &self,
        grid: &Grid<T>,
        start: Coordinate,
        target: Coordinate,
        max_walkable: u8,
        blocked: F,
    ) -> Vec<Coordinate>
    where
        T: TileKind,
        F: Fn(Coordinate) -> bool,
    {
        let (Some(start_index), Some(target_index)) =
            (grid.coordinate_to_index(start), grid.coordinate_to_index(target))
        else {
            return Vec::new();
        };

        if !grid.is_walkable(start, max_walkable) || !grid.is_walkable(target, max_walkable) {
            return Vec::new();
        }

        if start_index == target_index {
            return vec![start];
        }

        let passable = |c: Coordinate| {
            grid.is_walkable(c, max_walkable) && (c == target || !blocked(c))
        };

        let mut open_set = BinaryHeap::new();
        let mut g_score = vec![u32::MAX; grid.len()];
        let mut came_from = vec![usize::MAX; grid.len()];
        let mut visited = vec![false; grid.len()];
        let mut order = 0u64;

        g_score[start_index] = 0;
        open_set.push(OpenNode {
            f_score: self.options.heuristic.estimate(start, target),
            order,
            index: start_index,
        });

        while let Some(current_node) = open_set.pop() {
            let current_index = current_node.index;
            if visited[current_index] {
                continue;
            }
            visited[current_index] = true;

            if current_index == target_index {
                let path = reconstruct_path(grid, &came_from, start_index, target_index);
                log::trace!("path {} -> {}: {} tiles", start, target, path.len());
                return path;
            }

            let Some(current) = grid.index_to_coordinate(current_index) else {
                continue;
            };

            for (neighbor, step_cost) in self.steps_from(current, &passable) {
                let Some(neighbor_index) = grid.coordinate_to_index(neighbor) else {
                    continue;
                };
                if visited[neighbor_index] {
                    continue;
                }

                let tentative_g_score = g_score[current_index] + step_cost;
                if tentative_g_score < g_score[neighbor_index] {
                    came_from[neighbor_index] = current_index;
                    g_score[neighbor_index] = tentative_g_score;
                    order += 1;
                    open_set.push(OpenNode {
                        f_score: tentative_g_score + self.options.heuristic.estimate(neighbor, target),
                        order,
                        index: neighbor_index,
                    });
                }
            }
        }

        log::trace!("no path {} -> {}", start, target);
        Vec::new()
    }

    /// Passable neighbours of `current` with their step costs.
    fn steps_from<P>(&self, current: Coordinate, passable: &P) -> Vec<(Coordinate, u32)>
    where
        P: Fn(Coordinate) -> bool,
    {
        let directions = if self.options.diagonal {
            Direction::all()
        } else {
            Direction::cardinal()
        };

        directions
            .into_iter()
            .filter_map(|direction| {
                let delta = direction.to_delta();
                let neighbor = current + delta;
                if !passable(neighbor) {
                    return None;
                }
                if direction.is_diagonal() {
                    let side_a = Coordinate::new(current.x + delta.x, current.y);
                    let side_b = Coordinate::new(current.x, current.y + delta.y);
                    if !passable(side_a) || !passable(side_b) {
                        return None;
                    }
                    return Some((neighbor, DIAGONAL_COST));
                }
                Some((neighbor, CARDINAL_COST))
            })
            .collect()
    }
}

/// Walks the predecessor chain back from the target.
fn reconstruct_path<T: TileKind>(
    grid: &Grid<T>,
    came_from: &[usize],
    start_index: usize,
    target_index: usize,
) -> Vec<Coordinate> {
    let mut indices = vec![target_index];
    let mut current = target_index;
    while current != start_index {
        current = came_from[current];
        indices.push(current);
    }

    indices
        .into_iter()
        .rev()
        .filter_map(|index| grid.index_to_coordinate(index))
        .collect()
}

/// Finds a cardinal-movement route with default options.
///
/// `max_walkable` is mandatory: tiles with a larger value are never entered.
pub fn find_path<T: TileKind>(
    grid: &Grid<T>,
    start: Coordinate,
    target: Coordinate,
    max_walkable: u8,
) -> Vec<Coordinate> {
    Pathfinder::new().find_path(grid, start, target, max_walkable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildingTile, CaveTile, WorldTile};

    fn open_grid(width: u32, height: u32) -> Grid<BuildingTile> {
        Grid::filled(width, height, BuildingTile::Ground)
    }

    fn assert_contiguous(path: &[Coordinate], diagonal: bool) {
        for pair in path.windows(2) {
            let step = pair[1] - pair[0];
            let direction = Direction::from_delta(step).expect("steps must be adjacent");
            assert!(diagonal || !direction.is_diagonal());
        }
    }

    #[test]
    fn test_open_grid_path_length() {
        let grid = open_grid(5, 5);
        let path = find_path(&grid, Coordinate::new(0, 0), Coordinate::new(4, 4), BuildingTile::MAX_WALKABLE);
        assert_eq!(path.len(), 9);
        assert_eq!(path[0], Coordinate::new(0, 0));
        assert_eq!(path[8], Coordinate::new(4, 4));
        assert_contiguous(&path, false);
    }

    #[test]
    fn test_same_start_and_target() {
        let grid = open_grid(3, 3);
        let here = Coordinate::new(1, 1);
        assert_eq!(find_path(&grid, here, here, BuildingTile::MAX_WALKABLE), vec![here]);
    }

    #[test]
    fn test_enclosed_target_is_unreachable() {
        let mut grid: Grid<CaveTile> = Grid::filled(3, 3, CaveTile::Wall);
        grid.set(Coordinate::new(0, 0), CaveTile::Ground).unwrap();
        grid.set(Coordinate::new(1, 1), CaveTile::Ground).unwrap();

        let path = find_path(&grid, Coordinate::new(0, 0), Coordinate::new(1, 1), CaveTile::MAX_WALKABLE);
        assert!(path.is_empty());
    }

    #[test]
    fn test_unwalkable_or_out_of_bounds_endpoints() {
        let mut grid = open_grid(4, 4);
        grid.set(Coordinate::new(3, 3), BuildingTile::Wall).unwrap();

        let max = BuildingTile::MAX_WALKABLE;
        assert!(find_path(&grid, Coordinate::new(0, 0), Coordinate::new(3, 3), max).is_empty());
        assert!(find_path(&grid, Coordinate::new(3, 3), Coordinate::new(0, 0), max).is_empty());
        assert!(find_path(&grid, Coordinate::new(0, 0), Coordinate::new(4, 0), max).is_empty());
        assert!(find_path(&grid, Coordinate::new(-1, 0), Coordinate::new(1, 0), max).is_empty());
    }

    #[test]
    fn test_path_routes_around_wall() {
        // .....
        // .###.
        // .#...
        let mut grid = open_grid(5, 3);
        for c in [(1, 1), (2, 1), (3, 1), (1, 2)] {
            grid.set(Coordinate::new(c.0, c.1), BuildingTile::Wall).unwrap();
        }

        let path = find_path(&grid, Coordinate::new(0, 2), Coordinate::new(2, 2), BuildingTile::MAX_WALKABLE);
        assert_eq!(path.len(), 11);
        assert_contiguous(&path, false);
        for c in &path {
            assert!(grid.is_walkable(*c, BuildingTile::MAX_WALKABLE));
        }
    }

    #[test]
    fn test_threshold_controls_walkability() {
        let mut grid: Grid<WorldTile> = Grid::new(5, 1);
        grid.set(Coordinate::new(2, 0), WorldTile::Water).unwrap();

        let start = Coordinate::new(0, 0);
        let target = Coordinate::new(4, 0);
        assert!(find_path(&grid, start, target, WorldTile::MAX_WALKABLE).is_empty());
        assert_eq!(find_path(&grid, start, target, WorldTile::Water as u8).len(), 5);
    }

    #[test]
    fn test_stable_tie_break_is_deterministic() {
        let grid = open_grid(6, 6);
        let start = Coordinate::new(0, 0);
        let target = Coordinate::new(5, 5);
        let first = find_path(&grid, start, target, BuildingTile::MAX_WALKABLE);
        let second = find_path(&grid, start, target, BuildingTile::MAX_WALKABLE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_diagonal_movement() {
        let grid = open_grid(5, 5);
        let pathfinder = Pathfinder::with_options(PathOptions::diagonal());
        let path = pathfinder.find_path(&grid, Coordinate::new(0, 0), Coordinate::new(4, 4), BuildingTile::MAX_WALKABLE);
        assert_eq!(path.len(), 5);
        assert_contiguous(&path, true);
    }

    #[test]
    fn test_diagonal_never_cuts_corners() {
        // .#
        // ..
        let mut grid = open_grid(2, 2);
        grid.set(Coordinate::new(1, 0), BuildingTile::Wall).unwrap();
        let pathfinder = Pathfinder::with_options(PathOptions::diagonal());
        let path = pathfinder.find_path(&grid, Coordinate::new(0, 0), Coordinate::new(1, 1), BuildingTile::MAX_WALKABLE);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_blocked_cells_are_avoided_except_target() {
        let grid = open_grid(3, 1);
        let start = Coordinate::new(0, 0);
        let middle = Coordinate::new(1, 0);
        let target = Coordinate::new(2, 0);
        let pathfinder = Pathfinder::new();

        let around = pathfinder.find_path_avoiding(&grid, start, target, BuildingTile::MAX_WALKABLE, |c| c == middle);
        assert!(around.is_empty());

        let onto = pathfinder.find_path_avoiding(&grid, start, target, BuildingTile::MAX_WALKABLE, |c| c == target);
        assert_eq!(onto, vec![start, middle, target]);
    }

    #[test]
    fn test_heuristic_estimates() {
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(3, 4);
        assert_eq!(Heuristic::Manhattan.estimate(a, b), 70);
        assert_eq!(Heuristic::Octile.estimate(a, b), 52);
        assert_eq!(Heuristic::Euclidean.estimate(a, b), 50);
    }
}
