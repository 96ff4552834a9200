//! # World Module
//!
//! Spatial data model shared by every engine subsystem.
//!
//! This module contains the building blocks the generators, the placement
//! resolver, the pathfinder and the occupancy cache all operate on:
//! - Integer tile coordinates and movement directions
//! - Tile enumerations for each grid kind and their walkability thresholds
//! - The bounds-checked, row-major terrain grid
//! - Placed objects (buildings, shops, caves, items, characters)
//! - The environment context that owns one grid and its objects

pub mod environment;
pub mod grid;
pub mod objects;
pub mod tiles;

pub use environment::*;
pub use grid::*;
pub use objects::*;
pub use tiles::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D tile coordinate.
///
/// # Examples
///
/// ```
/// use terrasim::Coordinate;
///
/// let c = Coordinate::new(10, 5);
/// assert_eq!(c.x, 10);
/// assert_eq!(c.y, 5);
///
/// let adjacent = c.adjacent_coordinates();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding coordinates
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin coordinate (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use terrasim::Coordinate;
    ///
    /// let a = Coordinate::new(0, 0);
    /// let b = Coordinate::new(3, 4);
    /// assert_eq!(a.manhattan_distance(b), 7);
    /// ```
    pub fn manhattan_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Calculates the Chebyshev (king move) distance to another coordinate.
    pub fn chebyshev_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Calculates the Euclidean distance to another coordinate.
    pub fn euclidean_distance(self, other: Coordinate) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns all 8 adjacent coordinates (including diagonals).
    pub fn adjacent_coordinates(self) -> Vec<Coordinate> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }

    /// Returns only the 4 cardinal adjacent coordinates (no diagonals).
    ///
    /// Order is north, west, east, south.
    pub fn cardinal_adjacent_coordinates(self) -> Vec<Coordinate> {
        vec![
            Coordinate::new(self.x, self.y - 1), // N
            Coordinate::new(self.x - 1, self.y), // W
            Coordinate::new(self.x + 1, self.y), // E
            Coordinate::new(self.x, self.y + 1), // S
        ]
    }

    /// Moves one unit along each axis towards `target`, never overshooting it.
    pub fn step_towards(self, target: Coordinate) -> Coordinate {
        Coordinate::new(
            self.x + (target.x - self.x).signum(),
            self.y + (target.y - self.y).signum(),
        )
    }
}

impl std::ops::Add for Coordinate {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Coordinate {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.x, self.y)
    }
}

/// Directions for movement and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Converts a direction to a coordinate delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use terrasim::{Coordinate, Direction};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Coordinate::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Coordinate {
        match self {
            Direction::North => Coordinate::new(0, -1),
            Direction::South => Coordinate::new(0, 1),
            Direction::East => Coordinate::new(1, 0),
            Direction::West => Coordinate::new(-1, 0),
            Direction::Northeast => Coordinate::new(1, -1),
            Direction::Northwest => Coordinate::new(-1, -1),
            Direction::Southeast => Coordinate::new(1, 1),
            Direction::Southwest => Coordinate::new(-1, 1),
        }
    }

    /// Converts a coordinate delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a single step.
    pub fn from_delta(delta: Coordinate) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::Northeast),
            (-1, -1) => Some(Direction::Northwest),
            (1, 1) => Some(Direction::Southeast),
            (-1, 1) => Some(Direction::Southwest),
            _ => None,
        }
    }

    /// Whether this direction moves along both axes.
    pub fn is_diagonal(self) -> bool {
        let delta = self.to_delta();
        delta.x != 0 && delta.y != 0
    }

    /// Returns all 8 directions.
    pub fn all() -> Vec<Direction> {
        vec![
            Direction::Northwest,
            Direction::North,
            Direction::Northeast,
            Direction::West,
            Direction::East,
            Direction::Southwest,
            Direction::South,
            Direction::Southeast,
        ]
    }

    /// Returns only the 4 cardinal directions.
    pub fn cardinal() -> Vec<Direction> {
        vec![
            Direction::North,
            Direction::West,
            Direction::East,
            Direction::South,
        ]
    }
}
