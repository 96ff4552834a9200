//! # Placement Module
//!
//! Finds free anchors for buildings, shops, caves and items on generated terrain.
//!
//! A candidate anchor is free when every tile of the object's footprint,
//! widened by a padding margin, is on the grid and whitelisted, and the
//! object's bounding circle overlaps no other object's circle. Structures also
//! need a walkable entrance and approach, and may not wall over the doorway
//! of a structure placed before them. Occupied
//! candidates step diagonally towards the grid centre (the direction is fixed
//! once from the starting quadrant) and are clamped to the grid, for a fixed
//! number of attempts. Running out of attempts yields `None`.

use crate::utils::math::{clamp_i32, object_overlaps_at};
use crate::{config, Coordinate, Grid, PlacedObject, TerraError, TerraResult, TileKind};
use serde::{Deserialize, Serialize};

/// Search budget and spacing for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Candidate anchors tried before giving up
    pub max_attempts: u32,
    /// Extra tiles around the footprint that must also be whitelisted
    pub padding: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_attempts: config::PLACEMENT_RETRY_BUDGET,
            padding: config::PLACEMENT_PADDING,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> TerraResult<()> {
        if self.max_attempts == 0 {
            return Err(TerraError::InvalidConfig(
                "placement needs at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolves free positions for placed objects.
///
/// # Examples
///
/// ```
/// use terrasim::{BuildingTile, Coordinate, Grid, ObjectKind, PlacedObject, PlacementResolver};
///
/// let mut grid: Grid<BuildingTile> = Grid::filled(20, 20, BuildingTile::Ground);
/// let mut shop = PlacedObject::new(ObjectKind::Shop, Coordinate::new(5, 5), 3, 3);
///
/// let anchor = PlacementResolver::new().reserve_object(&mut shop, &mut grid, &[], None);
/// assert_eq!(anchor, Some(Coordinate::new(5, 5)));
/// // The footprint is walled in except for the entrance below the anchor.
/// assert_eq!(grid.get(Coordinate::new(5, 6)), Some(BuildingTile::Ground));
/// assert_eq!(grid.get(Coordinate::new(4, 6)), Some(BuildingTile::Wall));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlacementResolver {
    pub config: PlacementConfig,
}

impl PlacementResolver {
    /// Creates a resolver with the default retry budget and padding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with explicit settings.
    pub fn with_config(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// Checks whether `object` could stand at `anchor`.
    ///
    /// Objects in `others` sharing the object's ID are ignored so an object
    /// can be re-checked against a list that already contains it.
    pub fn check_if_free<T: TileKind>(
        &self,
        object: &PlacedObject,
        anchor: Coordinate,
        grid: &Grid<T>,
        others: &[PlacedObject],
        whitelist: &[T],
    ) -> bool {
        let padding = self.config.padding as i32;
        let top_left = object.top_left_at(anchor);
        let left = top_left.x - padding;
        let top = top_left.y - padding;
        let right = top_left.x + object.width as i32 - 1 + padding;
        let bottom = top_left.y + object.height as i32 - 1 + padding;

        let terrain_ok = (top..=bottom).all(|y| {
            (left..=right).all(|x| {
                grid.get(Coordinate::new(x, y))
                    .is_some_and(|tile| whitelist.contains(&tile))
            })
        });
        if !terrain_ok {
            return false;
        }

        if object.kind.is_structure() && !self.doorway_is_clear(object, anchor, grid, others) {
            return false;
        }

        !others
            .iter()
            .filter(|other| other.id != object.id)
            .any(|other| object_overlaps_at(object, anchor, other))
    }

    /// Searches for a free anchor without touching the grid.
    pub fn find_free_anchor<T: TileKind>(
        &self,
        object: &PlacedObject,
        grid: &Grid<T>,
        others: &[PlacedObject],
        whitelist: Option<&[T]>,
    ) -> Option<Coordinate> {
        let whitelist = whitelist.unwrap_or(T::default_whitelist());
        let center = grid.center();
        let step = Coordinate::new(
            if object.position.x < center.x { 1 } else { -1 },
            if object.position.y < center.y { 1 } else { -1 },
        );

        let mut candidate = self.clamp_anchor(object, object.position, grid);
        for attempt in 0..self.config.max_attempts {
            if self.check_if_free(object, candidate, grid, others, whitelist) {
                log::trace!(
                    "{} fits at {} after {} attempts",
                    object.kind.label(),
                    candidate,
                    attempt + 1
                );
                return Some(candidate);
            }
            candidate = self.clamp_anchor(object, candidate + step, grid);
        }

        log::warn!(
            "no space for {} {}x{} near {} after {} attempts",
            object.kind.label(),
            object.width,
            object.height,
            object.position,
            self.config.max_attempts
        );
        None
    }

    /// Finds a free anchor, moves the object there and walls it in.
    ///
    /// The one-tile ring around the footprint becomes the kind's barrier tile,
    /// except the entrance directly below the anchor.
    pub fn reserve_object<T: TileKind>(
        &self,
        object: &mut PlacedObject,
        grid: &mut Grid<T>,
        others: &[PlacedObject],
        whitelist: Option<&[T]>,
    ) -> Option<Coordinate> {
        let anchor = self.find_free_anchor(object, grid, others, whitelist)?;
        object.position = anchor;
        carve_border(object, grid);
        Some(anchor)
    }

    /// Whether a structure at `anchor` keeps every doorway open.
    ///
    /// Its own entrance and approach must be walkable, and neither its
    /// footprint nor its barrier ring may cover another structure's
    /// entrance or approach.
    fn doorway_is_clear<T: TileKind>(
        &self,
        object: &PlacedObject,
        anchor: Coordinate,
        grid: &Grid<T>,
        others: &[PlacedObject],
    ) -> bool {
        let entrance = Coordinate::new(anchor.x, anchor.y + 1);
        let approach = Coordinate::new(anchor.x, anchor.y + 2);
        if !grid.is_walkable(entrance, T::MAX_WALKABLE) || !grid.is_walkable(approach, T::MAX_WALKABLE) {
            return false;
        }

        let top_left = object.top_left_at(anchor);
        let walled = |c: Coordinate| {
            c.x >= top_left.x - 1
                && c.y >= top_left.y - 1
                && c.x <= top_left.x + object.width as i32
                && c.y <= top_left.y + object.height as i32
        };
        !others
            .iter()
            .filter(|other| other.id != object.id && other.kind.is_structure())
            .any(|other| walled(other.entrance()) || walled(other.approach()))
    }

    /// Clamps an anchor so the padded footprint stays on the grid.
    ///
    /// Structures also keep their approach tile on the grid.
    fn clamp_anchor<T: TileKind>(&self, object: &PlacedObject, anchor: Coordinate, grid: &Grid<T>) -> Coordinate {
        let padding = self.config.padding as i32;
        let below = if object.kind.is_structure() { padding.max(2) } else { padding };
        let half_left = (object.width / 2) as i32;
        let half_right = object.width as i32 - half_left - 1;
        let min_x = half_left + padding;
        let max_x = grid.width() as i32 - 1 - half_right - padding;
        let min_y = object.height as i32 - 1 + padding;
        let max_y = grid.height() as i32 - 1 - below;
        Coordinate::new(
            clamp_i32(anchor.x, min_x, max_x),
            clamp_i32(anchor.y, min_y, max_y),
        )
    }
}

/// Converts the ring around an object's footprint into barrier tiles,
/// leaving the entrance open.
///
/// Returns each changed tile with the terrain it replaced, so the ring can be
/// restored when the object is removed.
pub fn carve_border<T: TileKind>(object: &PlacedObject, grid: &mut Grid<T>) -> Vec<(Coordinate, T)> {
    let top_left = object.top_left();
    let bottom_right = object.bottom_right();
    let entrance = object.entrance();
    let mut replaced = Vec::new();

    for y in top_left.y - 1..=bottom_right.y + 1 {
        for x in top_left.x - 1..=bottom_right.x + 1 {
            let c = Coordinate::new(x, y);
            if object.covers(c) || c == entrance {
                continue;
            }
            if let Some(previous) = grid.get(c) {
                grid.set_if_in_bounds(c, T::barrier());
                replaced.push((c, previous));
            }
        }
    }
    replaced
}

/// Puts back the terrain recorded by [`carve_border`].
///
/// Tiles that are no longer the barrier were edited since and are left alone.
pub fn restore_border<T: TileKind>(replaced: &[(Coordinate, T)], grid: &mut Grid<T>) -> usize {
    let mut restored = 0;
    for &(c, previous) in replaced {
        if grid.get(c) == Some(T::barrier()) && grid.set_if_in_bounds(c, previous) {
            restored += 1;
        }
    }
    restored
}

/// Places an object with a default resolver; see [`PlacementResolver::reserve_object`].
pub fn reserve_object<T: TileKind>(
    object: &mut PlacedObject,
    grid: &mut Grid<T>,
    others: &[PlacedObject],
    whitelist: Option<&[T]>,
) -> Option<Coordinate> {
    PlacementResolver::new().reserve_object(object, grid, others, whitelist)
}
