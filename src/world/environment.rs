//! # Environment
//!
//! One world map, building floor or cave level: the terrain grid together
//! with the objects placed on it and the occupancy of its dynamic objects.
//!
//! All mutation goes through `&mut self`, so terrain edits, placement and
//! movement are serialised by the borrow checker rather than by locks.

use crate::{
    carve_border, restore_border, Coordinate, Grid, GridKind, ObjectId, OccupancyCache, PathOptions, Pathfinder,
    PlacedObject, PlacementConfig, PlacementResolver, TerraError, TerraResult, TileKind,
};
use serde::Serialize;
use std::collections::HashMap;

/// A grid plus everything standing on it.
///
/// # Examples
///
/// ```
/// use terrasim::{BuildingTile, Coordinate, Environment, Grid, PlacedObject};
///
/// let mut floor = Environment::new(Grid::filled(10, 10, BuildingTile::Ground));
/// let hero = PlacedObject::character("hero", Coordinate::new(1, 1));
/// let id = hero.id;
///
/// assert_eq!(floor.spawn_dynamic(hero), Some(Coordinate::new(1, 1)));
/// let path = floor.plan_path(id, Coordinate::new(4, 1), 1).unwrap();
/// assert_eq!(path.len(), 4);
/// assert!(floor.step_object(id, path[1], 1).unwrap());
/// assert_eq!(floor.object(id).unwrap().position, Coordinate::new(2, 1));
/// ```
#[derive(Debug, Clone)]
pub struct Environment<T: TileKind> {
    grid: Grid<T>,
    /// Buildings, shops, caves and items
    static_objects: Vec<PlacedObject>,
    /// Characters and enemies
    dynamic_objects: Vec<PlacedObject>,
    occupancy: OccupancyCache,
    /// Terrain under each structure's barrier ring
    carved: HashMap<ObjectId, Vec<(Coordinate, T)>>,
    resolver: PlacementResolver,
    pathfinder: Pathfinder,
}

/// Read-only view of an environment for serialisation.
#[derive(Debug, Serialize)]
pub struct EnvironmentSnapshot<'a, T: TileKind> {
    pub kind: GridKind,
    pub grid: &'a Grid<T>,
    pub static_objects: &'a [PlacedObject],
    pub dynamic_objects: &'a [PlacedObject],
}

impl<T: TileKind> Environment<T> {
    /// Wraps a generated grid with default placement and pathfinding settings.
    pub fn new(grid: Grid<T>) -> Self {
        Self {
            grid,
            static_objects: Vec::new(),
            dynamic_objects: Vec::new(),
            occupancy: OccupancyCache::new(),
            carved: HashMap::new(),
            resolver: PlacementResolver::new(),
            pathfinder: Pathfinder::new(),
        }
    }

    pub fn with_placement(mut self, config: PlacementConfig) -> Self {
        self.resolver = PlacementResolver::with_config(config);
        self
    }

    pub fn with_path_options(mut self, options: PathOptions) -> Self {
        self.pathfinder = Pathfinder::with_options(options);
        self
    }

    pub fn kind(&self) -> GridKind {
        T::GRID_KIND
    }

    pub fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    /// Mutable terrain access. Occupancy is not revalidated.
    pub fn grid_mut(&mut self) -> &mut Grid<T> {
        &mut self.grid
    }

    pub fn occupancy(&self) -> &OccupancyCache {
        &self.occupancy
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn static_objects(&self) -> &[PlacedObject] {
        &self.static_objects
    }

    pub fn dynamic_objects(&self) -> &[PlacedObject] {
        &self.dynamic_objects
    }

    /// Every object, static first.
    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> + '_ {
        self.static_objects.iter().chain(self.dynamic_objects.iter())
    }

    /// Looks up an object by ID.
    pub fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects().find(|object| object.id == id)
    }

    pub fn snapshot(&self) -> EnvironmentSnapshot<'_, T> {
        EnvironmentSnapshot {
            kind: T::GRID_KIND,
            grid: &self.grid,
            static_objects: &self.static_objects,
            dynamic_objects: &self.dynamic_objects,
        }
    }

    /// Places an object near its current position.
    ///
    /// Structures are walled in with an entrance; items only need a free
    /// anchor. Characters and enemies are forwarded to
    /// [`spawn_dynamic`](Self::spawn_dynamic). Returns the final anchor, or
    /// `None` when the search budget ran out.
    pub fn place_static(&mut self, mut object: PlacedObject, whitelist: Option<&[T]>) -> Option<Coordinate> {
        if object.kind.is_dynamic() {
            return self.spawn_dynamic(object);
        }

        let anchor = self
            .resolver
            .find_free_anchor(&object, &self.grid, &self.static_objects, whitelist)?;
        object.position = anchor;
        if object.kind.is_structure() {
            let replaced = carve_border(&object, &mut self.grid);
            self.carved.insert(object.id, replaced);
        }

        log::debug!("placed {} {} at {}", object.kind.label(), object.id, anchor);
        self.static_objects.push(object);
        Some(anchor)
    }

    /// Puts a character or enemy on the nearest free tile to its position.
    pub fn spawn_dynamic(&mut self, mut object: PlacedObject) -> Option<Coordinate> {
        let anchor = self
            .occupancy
            .reserve_at_nearest_position(&self.grid, object.position, object.id)?;
        object.position = anchor;
        log::debug!("spawned {} {} at {}", object.kind.label(), object.id, anchor);
        self.dynamic_objects.push(object);
        Some(anchor)
    }

    /// Removes an object, releasing its occupancy if it was dynamic.
    ///
    /// A structure's barrier ring goes back to the terrain it replaced.
    pub fn remove_object(&mut self, id: ObjectId) -> TerraResult<PlacedObject> {
        if let Some(index) = self.dynamic_objects.iter().position(|o| o.id == id) {
            let object = self.dynamic_objects.remove(index);
            self.occupancy.clear_objects(std::slice::from_ref(&object));
            return Ok(object);
        }
        if let Some(index) = self.static_objects.iter().position(|o| o.id == id) {
            if let Some(replaced) = self.carved.remove(&id) {
                let restored = restore_border(&replaced, &mut self.grid);
                log::trace!("restored {} tiles around {}", restored, id);
            }
            return Ok(self.static_objects.remove(index));
        }
        Err(TerraError::ObjectNotFound(id))
    }

    /// Whether a tile is walkable and, unless `terrain_only`, unoccupied.
    pub fn is_position_free(&self, c: Coordinate, terrain_only: bool) -> bool {
        self.occupancy.is_position_free(&self.grid, c, terrain_only)
    }

    /// Plans a route for an object, walking around other dynamic objects.
    ///
    /// The route starts at the object's own tile. An empty route means the
    /// target cannot be reached.
    pub fn plan_path(&self, id: ObjectId, target: Coordinate, max_walkable: u8) -> TerraResult<Vec<Coordinate>> {
        let object = self.object(id).ok_or(TerraError::ObjectNotFound(id))?;
        let occupancy = &self.occupancy;
        Ok(self.pathfinder.find_path_avoiding(
            &self.grid,
            object.position,
            target,
            max_walkable,
            |c| occupancy.occupant(c).is_some_and(|holder| holder != id),
        ))
    }

    /// Moves a dynamic object one step under the same threshold its route was
    /// planned with.
    ///
    /// Returns `Ok(false)` when the step is not adjacent (diagonals only when
    /// the pathfinder allows them), the tile is above `max_walkable`, or
    /// another object holds it.
    pub fn step_object(&mut self, id: ObjectId, next: Coordinate, max_walkable: u8) -> TerraResult<bool> {
        let diagonal = self.pathfinder.options.diagonal;
        let object = self
            .dynamic_objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(TerraError::ObjectNotFound(id))?;

        let from = object.position;
        let adjacent = if diagonal {
            from.chebyshev_distance(next) == 1
        } else {
            from.manhattan_distance(next) == 1
        };
        if !adjacent || !self.grid.is_walkable(next, max_walkable) {
            return Ok(false);
        }
        if !self.occupancy.relocate(id, from, next) {
            log::trace!("{} blocked at {}", id, next);
            return Ok(false);
        }

        object.position = next;
        Ok(true)
    }

    /// Rebuilds the occupancy cache from the dynamic objects' positions.
    pub fn rebuild_occupancy(&mut self) {
        self.occupancy.flush();
        self.occupancy.cache_objects(&self.dynamic_objects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildingTile, ObjectKind, WorldTile};

    fn floor(width: u32, height: u32) -> Environment<BuildingTile> {
        Environment::new(Grid::filled(width, height, BuildingTile::Ground))
    }

    #[test]
    fn test_structures_are_walled_items_are_not() {
        let mut env = floor(20, 20);
        let shop = PlacedObject::new(ObjectKind::Shop, Coordinate::new(5, 5), 3, 3);
        let anchor = env.place_static(shop, None).unwrap();
        assert_eq!(env.grid().get(Coordinate::new(anchor.x - 2, anchor.y)), Some(BuildingTile::Wall));

        let walls = env.grid().count(BuildingTile::Wall);
        let item = PlacedObject::item("key", Coordinate::new(15, 15));
        assert!(env.place_static(item, None).is_some());
        assert_eq!(env.grid().count(BuildingTile::Wall), walls);
        assert_eq!(env.static_objects().len(), 2);
    }

    #[test]
    fn test_placed_structures_never_overlap() {
        let mut env: Environment<WorldTile> = Environment::new(Grid::filled(40, 40, WorldTile::Ground));
        for _ in 0..4 {
            let building = PlacedObject::new(ObjectKind::Building { floors: 1 }, Coordinate::new(10, 10), 4, 3);
            assert!(env.place_static(building, None).is_some());
        }
        let objects = env.static_objects();
        for (i, a) in objects.iter().enumerate() {
            for b in &objects[i + 1..] {
                assert!(!crate::utils::math::object_overlaps_at(a, a.position, b));
            }
        }
    }

    #[test]
    fn test_dynamic_objects_spread_out() {
        let mut env = floor(10, 10);
        let a = env.place_static(PlacedObject::enemy("rat", Coordinate::new(5, 5)), None);
        let b = env.spawn_dynamic(PlacedObject::enemy("rat", Coordinate::new(5, 5)));
        assert_eq!(a, Some(Coordinate::new(5, 5)));
        assert_eq!(b, Some(Coordinate::new(4, 4)));
        assert_eq!(env.dynamic_objects().len(), 2);
        assert_eq!(env.occupancy().len(), 2);
    }

    #[test]
    fn test_plan_path_avoids_other_actors() {
        let mut env = floor(5, 3);
        let hero = PlacedObject::character("hero", Coordinate::new(0, 1));
        let hero_id = hero.id;
        env.spawn_dynamic(hero);
        env.spawn_dynamic(PlacedObject::enemy("slime", Coordinate::new(2, 1)));

        let path = env.plan_path(hero_id, Coordinate::new(4, 1), 1).unwrap();
        assert_eq!(path.first(), Some(&Coordinate::new(0, 1)));
        assert_eq!(path.last(), Some(&Coordinate::new(4, 1)));
        assert!(!path.contains(&Coordinate::new(2, 1)));
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn test_step_object() {
        let mut env = floor(5, 5);
        let hero = PlacedObject::character("hero", Coordinate::new(1, 1));
        let hero_id = hero.id;
        env.spawn_dynamic(hero);
        env.spawn_dynamic(PlacedObject::enemy("slime", Coordinate::new(2, 1)));
        env.grid_mut().set(Coordinate::new(1, 2), BuildingTile::Wall).unwrap();

        assert!(!env.step_object(hero_id, Coordinate::new(2, 1), 1).unwrap());
        assert!(!env.step_object(hero_id, Coordinate::new(1, 2), 1).unwrap());
        assert!(!env.step_object(hero_id, Coordinate::new(2, 2), 1).unwrap());
        assert!(!env.step_object(hero_id, Coordinate::new(1, 3), 1).unwrap());
        assert!(env.step_object(hero_id, Coordinate::new(0, 1), 1).unwrap());

        assert!(env.is_position_free(Coordinate::new(1, 1), false));
        assert_eq!(env.occupancy().occupant(Coordinate::new(0, 1)), Some(hero_id));
    }

    #[test]
    fn test_diagonal_steps_are_opt_in() {
        let mut env = floor(5, 5).with_path_options(PathOptions::diagonal());
        let hero = PlacedObject::character("hero", Coordinate::new(1, 1));
        let hero_id = hero.id;
        env.spawn_dynamic(hero);
        assert!(env.step_object(hero_id, Coordinate::new(2, 2), 1).unwrap());
    }

    #[test]
    fn test_remove_object() {
        let mut env = floor(6, 6);
        let slime = PlacedObject::enemy("slime", Coordinate::new(3, 3));
        let id = slime.id;
        env.spawn_dynamic(slime);

        let removed = env.remove_object(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(env.occupancy().is_empty());
        assert!(matches!(env.remove_object(id), Err(TerraError::ObjectNotFound(_))));
        assert!(matches!(env.plan_path(id, Coordinate::origin(), 1), Err(TerraError::ObjectNotFound(_))));
        assert!(matches!(env.step_object(id, Coordinate::origin(), 1), Err(TerraError::ObjectNotFound(_))));
    }

    #[test]
    fn test_route_follows_callers_threshold() {
        let mut env: Environment<WorldTile> = Environment::new(Grid::filled(5, 3, WorldTile::Grass));
        for y in 0..3 {
            env.grid_mut().set(Coordinate::new(2, y), WorldTile::Water).unwrap();
        }
        let hero = PlacedObject::character("hero", Coordinate::new(0, 1));
        let hero_id = hero.id;
        env.spawn_dynamic(hero);

        let wading = WorldTile::Water as u8;
        assert!(env.plan_path(hero_id, Coordinate::new(4, 1), WorldTile::MAX_WALKABLE).unwrap().is_empty());
        let path = env.plan_path(hero_id, Coordinate::new(4, 1), wading).unwrap();
        assert_eq!(path.len(), 5);

        assert!(env.step_object(hero_id, path[1], wading).unwrap());
        assert!(!env.step_object(hero_id, path[2], WorldTile::MAX_WALKABLE).unwrap());
        for &next in &path[2..] {
            assert!(env.step_object(hero_id, next, wading).unwrap());
        }
        assert_eq!(env.object(hero_id).map(|o| o.position), Some(Coordinate::new(4, 1)));
    }

    #[test]
    fn test_removing_a_structure_restores_its_ring() {
        let mut env = floor(12, 12);
        let shop = PlacedObject::new(ObjectKind::Shop, Coordinate::new(5, 5), 3, 2);
        let id = shop.id;
        env.place_static(shop, None).unwrap();
        assert!(env.grid().count(BuildingTile::Wall) > 0);

        env.remove_object(id).unwrap();
        assert_eq!(env.grid().count(BuildingTile::Wall), 0);

        // The freed site takes a new structure at the same anchor.
        let again = PlacedObject::new(ObjectKind::Shop, Coordinate::new(5, 5), 3, 2);
        assert_eq!(env.place_static(again, None), Some(Coordinate::new(5, 5)));
    }

    #[test]
    fn test_rebuild_occupancy() {
        let mut env = floor(6, 6);
        env.spawn_dynamic(PlacedObject::enemy("slime", Coordinate::new(3, 3)));
        env.spawn_dynamic(PlacedObject::enemy("bat", Coordinate::new(1, 1)));
        env.rebuild_occupancy();
        assert_eq!(env.occupancy().len(), 2);
        assert!(!env.is_position_free(Coordinate::new(3, 3), false));
    }

    #[test]
    fn test_snapshot_serialises() {
        let mut env = floor(4, 4);
        env.spawn_dynamic(PlacedObject::character("hero", Coordinate::new(1, 1)));
        let json = serde_json::to_value(env.snapshot()).unwrap();
        assert_eq!(json["kind"], "Building");
        assert_eq!(json["grid"]["width"], 4);
        assert_eq!(json["dynamic_objects"].as_array().unwrap().len(), 1);
    }
}
