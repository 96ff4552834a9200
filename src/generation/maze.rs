//! # Maze Digging
//!
//! Room-and-corridor digging for building floors and cave levels.
//!
//! The digger starts from a room in the middle of solid rock and repeatedly
//! tries to attach a new room or corridor to a random dug cell through a
//! one-tile doorway. Features must sit inside the grid border and keep a
//! one-tile margin of rock from everything already dug, so every feature is
//! connected to the first room and walls can always be raised around it.
//!
//! Digging stops once the dug area reaches the configured percentage of the
//! grid or the iteration budget runs out; a final pass turns every rock
//! cell touching floor into wall.

use crate::{config, Coordinate, Direction, Grid, MazeTiles, Neighborhood, TerraError, TerraResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive size range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub min: u32,
    pub max: u32,
}

impl SizeBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Parameters for one maze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// Room side length bounds
    pub room_size: SizeBounds,
    /// Corridor length bounds
    pub corridor_length: SizeBounds,
    /// Upper bound on dug tiles as a fraction of all tiles
    pub dug_percentage: f64,
    /// Maximum number of attach attempts
    pub max_iterations: u32,
    /// Probability that an attempt digs a corridor rather than a room
    pub corridor_chance: f64,
    /// Which rock cells next to floor become wall
    pub wall_neighborhood: Neighborhood,
}

impl MazeConfig {
    /// Room-heavy layout for building floors.
    pub fn building(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            room_size: SizeBounds::new(3, 7),
            corridor_length: SizeBounds::new(2, 5),
            dug_percentage: 0.45,
            max_iterations: config::MAZE_ITERATION_BUDGET,
            corridor_chance: 0.35,
            wall_neighborhood: Neighborhood::Moore,
        }
    }

    /// Corridor-heavy, sparser layout for cave levels.
    pub fn cave(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            room_size: SizeBounds::new(2, 5),
            corridor_length: SizeBounds::new(3, 9),
            dug_percentage: 0.35,
            max_iterations: config::MAZE_ITERATION_BUDGET,
            corridor_chance: 0.7,
            wall_neighborhood: Neighborhood::Moore,
        }
    }

    /// Checks that the maze parameters are usable.
    pub fn validate(&self) -> TerraResult<()> {
        if self.width < 3 || self.height < 3 {
            return Err(TerraError::InvalidConfig(format!(
                "maze must be at least 3x3, got {}x{}",
                self.width, self.height
            )));
        }
        for (name, bounds) in [("room_size", self.room_size), ("corridor_length", self.corridor_length)] {
            if bounds.min == 0 || bounds.min > bounds.max {
                return Err(TerraError::InvalidConfig(format!(
                    "{name} bounds {}..={} are empty or start at zero",
                    bounds.min, bounds.max
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.dug_percentage) {
            return Err(TerraError::InvalidConfig(format!(
                "dug_percentage must be within 0.0..=1.0, got {}",
                self.dug_percentage
            )));
        }
        if !(0.0..=1.0).contains(&self.corridor_chance) {
            return Err(TerraError::InvalidConfig(format!(
                "corridor_chance must be within 0.0..=1.0, got {}",
                self.corridor_chance
            )));
        }
        Ok(())
    }

    /// Most tiles the digger may turn into floor.
    pub fn max_dug_tiles(&self) -> usize {
        ((self.width as usize * self.height as usize) as f64 * self.dug_percentage).floor() as usize
    }
}

/// Kind of dug feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Room,
    Corridor,
}

/// A rectangle of floor dug by the maze generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DugFeature {
    pub kind: FeatureKind,
    pub top_left: Coordinate,
    pub width: u32,
    pub height: u32,
}

impl DugFeature {
    /// Number of floor tiles in the feature.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Centre tile of the feature.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    /// All tiles in the feature.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let top_left = self.top_left;
        (top_left.y..top_left.y + self.height as i32)
            .flat_map(move |y| (top_left.x..top_left.x + self.width as i32).map(move |x| Coordinate::new(x, y)))
    }
}

/// A generated maze: terrain plus what was dug.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze<T: MazeTiles> {
    /// Enclosed terrain of NOTHING, GROUND and WALL tiles
    pub grid: Grid<T>,
    /// Dug rooms and corridors in digging order; the first is the starting room
    pub features: Vec<DugFeature>,
    /// Number of floor tiles, doorways included
    pub dug_tiles: usize,
    /// Attach attempts consumed
    pub iterations: u32,
}

impl<T: MazeTiles> Maze<T> {
    /// Rooms only, in digging order.
    pub fn rooms(&self) -> impl Iterator<Item = &DugFeature> + '_ {
        self.features.iter().filter(|f| f.kind == FeatureKind::Room)
    }

    /// All floor tiles, row-major.
    pub fn floor_tiles(&self) -> Vec<Coordinate> {
        self.grid
            .coordinates()
            .filter(|&c| self.grid.get(c) == Some(T::ground()))
            .collect()
    }
}

/// Digs a maze with the given parameters.
///
/// Identical configurations and RNG states always produce identical mazes.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use terrasim::{generate_maze, CaveTile, MazeConfig};
///
/// let config = MazeConfig::cave(30, 20);
/// let mut rng = StdRng::seed_from_u64(5);
/// let maze = generate_maze::<CaveTile, _>(&config, &mut rng).unwrap();
/// assert!(maze.dug_tiles <= config.max_dug_tiles());
/// assert_eq!(maze.grid.count(CaveTile::Ground), maze.dug_tiles);
/// ```
pub fn generate_maze<T, R>(config: &MazeConfig, rng: &mut R) -> TerraResult<Maze<T>>
where
    T: MazeTiles,
    R: Rng + ?Sized,
{
    config.validate()?;

    let mut digger = Digger {
        grid: Grid::filled(config.width, config.height, T::nothing()),
        floor: Vec::new(),
        features: Vec::new(),
        max_dug: config.max_dug_tiles(),
    };

    let mut iterations = 0;
    if digger.dig_starting_room(config, rng) {
        while digger.floor.len() < digger.max_dug && iterations < config.max_iterations {
            iterations += 1;
            digger.try_attach_feature(config, rng);
        }
    }

    raise_walls(&mut digger.grid, config.wall_neighborhood);

    log::debug!(
        "dug {}x{} maze: {} features, {} floor tiles (cap {}), {} iterations",
        config.width,
        config.height,
        digger.features.len(),
        digger.floor.len(),
        digger.max_dug,
        iterations
    );

    Ok(Maze {
        dug_tiles: digger.floor.len(),
        grid: digger.grid,
        features: digger.features,
        iterations,
    })
}

/// Turns every NOTHING cell adjacent to GROUND into WALL.
pub fn raise_walls<T: MazeTiles>(grid: &mut Grid<T>, neighborhood: Neighborhood) -> usize {
    let walls: Vec<Coordinate> = grid
        .coordinates()
        .filter(|&c| grid.get(c) == Some(T::nothing()) && grid.has_neighbor(c, T::ground(), neighborhood))
        .collect();

    for &c in &walls {
        grid.set_if_in_bounds(c, T::wall());
    }
    walls.len()
}

/// Mutable digging state.
struct Digger<T: MazeTiles> {
    grid: Grid<T>,
    floor: Vec<Coordinate>,
    features: Vec<DugFeature>,
    max_dug: usize,
}

impl<T: MazeTiles> Digger<T> {
    /// Digs the first room around the grid centre, shrunk to fit the dig cap.
    fn dig_starting_room<R: Rng + ?Sized>(&mut self, config: &MazeConfig, rng: &mut R) -> bool {
        let inner_width = config.width - 2;
        let inner_height = config.height - 2;
        if self.max_dug == 0 || inner_width == 0 || inner_height == 0 {
            return false;
        }

        let mut width = config.room_size.sample(rng).min(inner_width);
        let mut height = config.room_size.sample(rng).min(inner_height);
        while width as usize * height as usize > self.max_dug {
            if width >= height && width > 1 {
                width -= 1;
            } else {
                height -= 1;
            }
        }

        let center = self.grid.center();
        let left = (center.x - width as i32 / 2).clamp(1, (config.width - 1 - width) as i32);
        let top = (center.y - height as i32 / 2).clamp(1, (config.height - 1 - height) as i32);
        self.dig(DugFeature {
            kind: FeatureKind::Room,
            top_left: Coordinate::new(left, top),
            width,
            height,
        });
        true
    }

    /// One attach attempt; returns whether something was dug.
    fn try_attach_feature<R: Rng + ?Sized>(&mut self, config: &MazeConfig, rng: &mut R) -> bool {
        let anchor = self.floor[rng.gen_range(0..self.floor.len())];
        let cardinal = Direction::cardinal();
        let direction = cardinal[rng.gen_range(0..cardinal.len())];
        let delta = direction.to_delta();

        let doorway = anchor + delta;
        if self.grid.get(doorway) != Some(T::nothing()) {
            return false;
        }

        let kind = if rng.gen_bool(config.corridor_chance) {
            FeatureKind::Corridor
        } else {
            FeatureKind::Room
        };
        let (width, height) = match kind {
            FeatureKind::Corridor => {
                let length = config.corridor_length.sample(rng);
                if delta.x != 0 {
                    (length, 1)
                } else {
                    (1, length)
                }
            }
            FeatureKind::Room => (config.room_size.sample(rng), config.room_size.sample(rng)),
        };

        // The feature starts one step beyond the doorway and extends away from
        // the anchor, shifted sideways so the doorway lines up with one of its cells.
        let entry = doorway + delta;
        let left = match delta.x {
            1 => entry.x,
            -1 => entry.x - width as i32 + 1,
            _ => entry.x - rng.gen_range(0..width) as i32,
        };
        let top = match delta.y {
            1 => entry.y,
            -1 => entry.y - height as i32 + 1,
            _ => entry.y - rng.gen_range(0..height) as i32,
        };
        let feature = DugFeature {
            kind,
            top_left: Coordinate::new(left, top),
            width,
            height,
        };

        if self.floor.len() + feature.area() + 1 > self.max_dug {
            return false;
        }
        if !self.fits(&feature, config) {
            return false;
        }

        self.dig_cell(doorway);
        self.dig(feature);
        log::trace!("dug {:?} at {} via doorway {}", kind, feature.top_left, doorway);
        true
    }

    /// Inside the border and surrounded by a one-tile rock margin.
    fn fits(&self, feature: &DugFeature, config: &MazeConfig) -> bool {
        let left = feature.top_left.x;
        let top = feature.top_left.y;
        let right = left + feature.width as i32 - 1;
        let bottom = top + feature.height as i32 - 1;
        if left < 1 || top < 1 || right > config.width as i32 - 2 || bottom > config.height as i32 - 2 {
            return false;
        }

        (top - 1..=bottom + 1).all(|y| {
            (left - 1..=right + 1).all(|x| self.grid.get(Coordinate::new(x, y)) == Some(T::nothing()))
        })
    }

    fn dig(&mut self, feature: DugFeature) {
        for c in feature.cells() {
            self.dig_cell(c);
        }
        self.features.push(feature);
    }

    fn dig_cell(&mut self, c: Coordinate) {
        if self.grid.get(c) == Some(T::nothing()) && self.grid.set_if_in_bounds(c, T::ground()) {
            self.floor.push(c);
        }
    }
}
