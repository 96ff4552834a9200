//! # Occupancy Module
//!
//! Tracks which tiles are held by dynamic objects (characters, enemies),
//! separately from static terrain, for constant-time collision queries.

use crate::{config, Coordinate, Grid, ObjectId, PlacedObject, TileKind};
use std::collections::HashMap;

/// Index from tile to the dynamic object standing on it.
///
/// Each environment owns its own cache; nothing is shared between worlds.
///
/// # Examples
///
/// ```
/// use terrasim::{new_object_id, CaveTile, Coordinate, Grid, OccupancyCache};
///
/// let grid: Grid<CaveTile> = Grid::filled(8, 8, CaveTile::Ground);
/// let mut cache = OccupancyCache::new();
/// let bat = new_object_id();
///
/// let spot = cache.reserve_at_nearest_position(&grid, Coordinate::new(3, 3), bat).unwrap();
/// assert!(!cache.is_position_free(&grid, spot, false));
/// assert!(cache.is_position_free(&grid, spot, true));
///
/// cache.flush();
/// assert!(cache.is_position_free(&grid, spot, false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OccupancyCache {
    positions: HashMap<Coordinate, ObjectId>,
}

impl OccupancyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied tiles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The object holding a tile, if any.
    pub fn occupant(&self, c: Coordinate) -> Option<ObjectId> {
        self.positions.get(&c).copied()
    }

    pub fn is_occupied(&self, c: Coordinate) -> bool {
        self.positions.contains_key(&c)
    }

    /// Records the footprint of every object in the batch.
    pub fn cache_objects(&mut self, objects: &[PlacedObject]) {
        for object in objects {
            for c in object.footprint() {
                self.positions.insert(c, object.id);
            }
        }
    }

    /// Forgets the footprint of every object in the batch.
    ///
    /// Tiles now held by a different object are left alone.
    pub fn clear_objects(&mut self, objects: &[PlacedObject]) {
        for object in objects {
            for c in object.footprint() {
                if self.occupant(c) == Some(object.id) {
                    self.positions.remove(&c);
                }
            }
        }
    }

    /// Whether a tile is walkable and, unless `terrain_only`, unoccupied.
    ///
    /// Off-grid tiles are never free.
    pub fn is_position_free<T: TileKind>(&self, grid: &Grid<T>, c: Coordinate, terrain_only: bool) -> bool {
        grid.is_walkable(c, T::MAX_WALKABLE) && (terrain_only || !self.is_occupied(c))
    }

    /// Claims exactly `c` for `id`. Fails when the tile is not free.
    pub fn reserve<T: TileKind>(&mut self, grid: &Grid<T>, c: Coordinate, id: ObjectId) -> bool {
        if !self.is_position_free(grid, c, false) {
            return false;
        }
        self.positions.insert(c, id);
        true
    }

    /// Claims the free tile closest to `c`, searching outward ring by ring.
    ///
    /// Ring 0 is `c` itself; each further ring is the square one step larger,
    /// walked clockwise from its top-left corner. Gives up after
    /// [`config::OCCUPANCY_RETRY_BUDGET`] expansions.
    pub fn reserve_at_nearest_position<T: TileKind>(
        &mut self,
        grid: &Grid<T>,
        c: Coordinate,
        id: ObjectId,
    ) -> Option<Coordinate> {
        for radius in 0..=config::OCCUPANCY_RETRY_BUDGET as i32 {
            if let Some(found) = ring(c, radius)
                .into_iter()
                .find(|&candidate| self.is_position_free(grid, candidate, false))
            {
                self.positions.insert(found, id);
                return Some(found);
            }
        }

        log::warn!(
            "no free tile within {} rings of {}",
            config::OCCUPANCY_RETRY_BUDGET,
            c
        );
        None
    }

    /// Frees a tile if `id` holds it.
    pub fn release(&mut self, c: Coordinate, id: ObjectId) -> bool {
        if self.occupant(c) == Some(id) {
            self.positions.remove(&c);
            return true;
        }
        false
    }

    /// Moves `id` from one tile to another.
    ///
    /// Fails without changing anything when `to` is held by another object.
    pub fn relocate(&mut self, id: ObjectId, from: Coordinate, to: Coordinate) -> bool {
        if self.occupant(to).is_some_and(|other| other != id) {
            return false;
        }
        self.release(from, id);
        self.positions.insert(to, id);
        true
    }

    /// Forgets every reservation.
    pub fn flush(&mut self) {
        log::trace!("flushing {} occupied tiles", self.positions.len());
        self.positions.clear();
    }

    /// Occupied tiles in no particular order.
    pub fn occupied_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.positions.keys().copied()
    }
}

/// Tiles at Chebyshev distance `radius` from `center`, clockwise from top-left.
fn ring(center: Coordinate, radius: i32) -> Vec<Coordinate> {
    if radius == 0 {
        return vec![center];
    }

    let (left, right) = (center.x - radius, center.x + radius);
    let (top, bottom) = (center.y - radius, center.y + radius);
    let mut tiles = Vec::with_capacity(8 * radius as usize);

    tiles.extend((left..right).map(|x| Coordinate::new(x, top)));
    tiles.extend((top..bottom).map(|y| Coordinate::new(right, y)));
    tiles.extend((left + 1..=right).rev().map(|x| Coordinate::new(x, bottom)));
    tiles.extend((top + 1..=bottom).rev().map(|y| Coordinate::new(left, y)));
    tiles
}
