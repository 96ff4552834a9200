//! # Terrain Grid
//!
//! Row-major tile storage for one environment (world, building floor or cave level).
//!
//! The terrain vector always holds exactly `width * height` tiles and cell
//! `(x, y)` lives at index `x + width * y`. Every read and write goes through
//! a bounds check; reads return `None` off the grid and writes return
//! [`TerraError::OutOfBounds`].

use crate::{Coordinate, TerraError, TerraResult, TileKind};
use pathfinding::prelude::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Neighbourhood shape used by growth, wall carving and flood fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighborhood {
    /// North, west, east and south only.
    Cardinal,
    /// All eight surrounding cells.
    Moore,
}

impl Neighborhood {
    /// Coordinates adjacent to `c` under this neighbourhood (not bounds-checked).
    pub fn around(self, c: Coordinate) -> Vec<Coordinate> {
        match self {
            Neighborhood::Cardinal => c.cardinal_adjacent_coordinates(),
            Neighborhood::Moore => c.adjacent_coordinates(),
        }
    }
}

/// Serialised form of a grid, validated on the way back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridData<T> {
    pub width: u32,
    pub height: u32,
    pub terrain: Vec<T>,
}

/// A rectangular terrain grid of one tile kind.
///
/// # Examples
///
/// ```
/// use terrasim::{Coordinate, Grid, WorldTile};
///
/// let mut grid: Grid<WorldTile> = Grid::new(4, 3);
/// grid.set(Coordinate::new(2, 1), WorldTile::Water).unwrap();
/// assert_eq!(grid.coordinate_to_index(Coordinate::new(2, 1)), Some(6));
/// assert_eq!(grid.get(Coordinate::new(2, 1)), Some(WorldTile::Water));
/// assert!(grid.get(Coordinate::new(4, 0)).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "GridData<T>",
    into = "GridData<T>",
    bound(serialize = "T: TileKind", deserialize = "T: TileKind")
)]
pub struct Grid<T: TileKind> {
    width: u32,
    height: u32,
    terrain: Vec<T>,
}

impl<T: TileKind> TryFrom<GridData<T>> for Grid<T> {
    type Error = TerraError;

    fn try_from(data: GridData<T>) -> Result<Self, Self::Error> {
        Grid::from_tiles(data.width, data.height, data.terrain)
    }
}

impl<T: TileKind> From<Grid<T>> for GridData<T> {
    fn from(grid: Grid<T>) -> Self {
        GridData {
            width: grid.width,
            height: grid.height,
            terrain: grid.terrain,
        }
    }
}

impl<T: TileKind> Grid<T> {
    /// Creates a grid filled with the kind's empty tile.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, T::empty())
    }

    /// Creates a grid filled with `tile`.
    pub fn filled(width: u32, height: u32, tile: T) -> Self {
        Self {
            width,
            height,
            terrain: vec![tile; width as usize * height as usize],
        }
    }

    /// Wraps an existing tile vector, checking its length.
    pub fn from_tiles(width: u32, height: u32, terrain: Vec<T>) -> TerraResult<Self> {
        let expected = width as usize * height as usize;
        if terrain.len() != expected {
            return Err(TerraError::InvalidGrid(format!(
                "terrain holds {} tiles but a {}x{} grid needs {}",
                terrain.len(),
                width,
                height,
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            terrain,
        })
    }

    /// Decodes raw numeric tile values into a grid.
    pub fn from_values(width: u32, height: u32, values: &[u8]) -> TerraResult<Self> {
        let terrain = values
            .iter()
            .map(|&value| T::try_from_value(value))
            .collect::<TerraResult<Vec<T>>>()?;
        Self::from_tiles(width, height, terrain)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.terrain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty()
    }

    /// Read-only view of the row-major terrain.
    pub fn tiles(&self) -> &[T] {
        &self.terrain
    }

    /// Raw numeric tile values, row-major.
    pub fn values(&self) -> Vec<u8> {
        self.terrain.iter().map(|tile| tile.value()).collect()
    }

    /// Checks whether a coordinate lies on the grid.
    pub fn in_bounds(&self, c: Coordinate) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.height
    }

    /// Converts a coordinate to its linear index (`x + width * y`).
    pub fn coordinate_to_index(&self, c: Coordinate) -> Option<usize> {
        if !self.in_bounds(c) {
            return None;
        }
        Some(c.x as usize + self.width as usize * c.y as usize)
    }

    /// Converts a linear index back into a coordinate.
    pub fn index_to_coordinate(&self, index: usize) -> Option<Coordinate> {
        if index >= self.terrain.len() {
            return None;
        }
        let width = self.width as usize;
        Some(Coordinate::new((index % width) as i32, (index / width) as i32))
    }

    /// Gets the tile at a coordinate.
    pub fn get(&self, c: Coordinate) -> Option<T> {
        self.coordinate_to_index(c).map(|index| self.terrain[index])
    }

    /// Gets the tile at a linear index.
    pub fn get_index(&self, index: usize) -> Option<T> {
        self.terrain.get(index).copied()
    }

    /// Sets the tile at a coordinate.
    pub fn set(&mut self, c: Coordinate, tile: T) -> TerraResult<()> {
        let index = self.coordinate_to_index(c).ok_or(TerraError::OutOfBounds {
            x: c.x,
            y: c.y,
            width: self.width,
            height: self.height,
        })?;
        self.terrain[index] = tile;
        Ok(())
    }

    /// Sets the tile at a coordinate if it is on the grid; returns whether it was.
    pub fn set_if_in_bounds(&mut self, c: Coordinate, tile: T) -> bool {
        match self.coordinate_to_index(c) {
            Some(index) => {
                self.terrain[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Fills a rectangle given by its top-left corner and size.
    pub fn fill_rect(&mut self, top_left: Coordinate, width: u32, height: u32, tile: T) -> TerraResult<()> {
        for y in top_left.y..top_left.y + height as i32 {
            for x in top_left.x..top_left.x + width as i32 {
                self.set(Coordinate::new(x, y), tile)?;
            }
        }
        Ok(())
    }

    /// Whether the coordinate is on the grid and its tile value is at most `max_walkable`.
    pub fn is_walkable(&self, c: Coordinate, max_walkable: u8) -> bool {
        self.get(c)
            .map(|tile| tile.is_walkable_under(max_walkable))
            .unwrap_or(false)
    }

    /// Counts tiles of the given type.
    pub fn count(&self, tile: T) -> usize {
        self.terrain.iter().filter(|&&t| t == tile).count()
    }

    /// Iterates every coordinate in row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Coordinate::new(x, y)))
    }

    /// In-bounds neighbours of `c`.
    pub fn neighbors(&self, c: Coordinate, neighborhood: Neighborhood) -> Vec<Coordinate> {
        neighborhood
            .around(c)
            .into_iter()
            .filter(|&n| self.in_bounds(n))
            .collect()
    }

    /// Whether any in-bounds neighbour of `c` holds `tile`.
    pub fn has_neighbor(&self, c: Coordinate, tile: T, neighborhood: Neighborhood) -> bool {
        self.neighbors(c, neighborhood)
            .into_iter()
            .any(|n| self.get(n) == Some(tile))
    }

    /// Centre cell of the grid.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.width as i32 / 2, self.height as i32 / 2)
    }

    /// All walkable cells reachable from `start` by cardinal steps.
    ///
    /// Returns an empty set when `start` itself is not walkable.
    pub fn reachable_from(&self, start: Coordinate, max_walkable: u8) -> HashSet<Coordinate> {
        if !self.is_walkable(start, max_walkable) {
            return HashSet::new();
        }

        bfs_reach(start, |&c| {
            c.cardinal_adjacent_coordinates()
                .into_iter()
                .filter(|&n| self.is_walkable(n, max_walkable))
                .collect::<Vec<_>>()
        })
        .collect()
    }

    /// Renders the terrain as one line of glyphs per row.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.terrain.len() + self.height as usize);
        for row in self.terrain.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|tile| tile.glyph()));
            out.push('\n');
        }
        out
    }
}
