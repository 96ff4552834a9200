//! # Placed Objects
//!
//! Discrete things that stand on a grid: buildings, shops, caves, items and
//! characters. An object is anchored at its horizontal centre and vertical
//! bottom; its rectangular footprint grows left/right from the anchor column
//! and upwards from the anchor row.

use crate::Coordinate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

/// Unique identifier for placed objects.
pub type ObjectId = Uuid;

/// Creates a new unique object ID.
pub fn new_object_id() -> ObjectId {
    Uuid::new_v4()
}

/// Creates a version 4 ID from a seeded generator, for reproducible worlds.
pub fn new_object_id_from_rng<R: Rng + ?Sized>(rng: &mut R) -> ObjectId {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// What a placed object is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Enterable building with a number of floors.
    Building { floors: u32 },
    /// Merchant building.
    Shop,
    /// Cave mouth leading to a number of cave levels.
    Cave { levels: u32 },
    /// Collectable item lying on the ground.
    Item { name: String },
    /// Player or friendly character.
    Character { name: String },
    /// Hostile creature.
    Enemy { name: String },
}

impl ObjectKind {
    /// Dynamic objects move and are tracked by the occupancy cache.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ObjectKind::Character { .. } | ObjectKind::Enemy { .. })
    }

    /// Static structures get a walled border and an entrance when placed.
    pub fn is_structure(&self) -> bool {
        matches!(
            self,
            ObjectKind::Building { .. } | ObjectKind::Shop | ObjectKind::Cave { .. }
        )
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Building { .. } => "building",
            ObjectKind::Shop => "shop",
            ObjectKind::Cave { .. } => "cave",
            ObjectKind::Item { .. } => "item",
            ObjectKind::Character { .. } => "character",
            ObjectKind::Enemy { .. } => "enemy",
        }
    }
}

/// An object with a tile footprint on a grid.
///
/// # Examples
///
/// ```
/// use terrasim::{Coordinate, ObjectKind, PlacedObject};
///
/// let shop = PlacedObject::new(ObjectKind::Shop, Coordinate::new(10, 8), 3, 2);
/// assert_eq!(shop.footprint().len(), 6);
/// assert_eq!(shop.entrance(), Coordinate::new(10, 9));
/// assert_eq!(shop.radius(), 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Unique identifier
    pub id: ObjectId,
    /// What this object is
    pub kind: ObjectKind,
    /// Anchor tile: horizontal centre, bottom row
    pub position: Coordinate,
    /// Footprint width in tiles
    pub width: u32,
    /// Footprint height in tiles
    pub height: u32,
}

impl PlacedObject {
    /// Creates a new object at a preferred anchor.
    pub fn new(kind: ObjectKind, position: Coordinate, width: u32, height: u32) -> Self {
        Self {
            id: new_object_id(),
            kind,
            position,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Replaces the random ID, e.g. with one drawn from a seeded generator.
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    /// A single-tile character.
    pub fn character(name: impl Into<String>, position: Coordinate) -> Self {
        Self::new(ObjectKind::Character { name: name.into() }, position, 1, 1)
    }

    /// A single-tile enemy.
    pub fn enemy(name: impl Into<String>, position: Coordinate) -> Self {
        Self::new(ObjectKind::Enemy { name: name.into() }, position, 1, 1)
    }

    /// A single-tile item.
    pub fn item(name: impl Into<String>, position: Coordinate) -> Self {
        Self::new(ObjectKind::Item { name: name.into() }, position, 1, 1)
    }

    /// Leftmost column for a hypothetical anchor.
    fn left_at(&self, anchor: Coordinate) -> i32 {
        anchor.x - (self.width / 2) as i32
    }

    fn top_at(&self, anchor: Coordinate) -> i32 {
        anchor.y - self.height as i32 + 1
    }

    /// Top-left tile of the footprint.
    pub fn top_left(&self) -> Coordinate {
        self.top_left_at(self.position)
    }

    /// Top-left tile of the footprint for a hypothetical anchor.
    pub fn top_left_at(&self, anchor: Coordinate) -> Coordinate {
        Coordinate::new(self.left_at(anchor), self.top_at(anchor))
    }

    /// Bottom-right tile of the footprint.
    pub fn bottom_right(&self) -> Coordinate {
        let top_left = self.top_left();
        Coordinate::new(
            top_left.x + self.width as i32 - 1,
            top_left.y + self.height as i32 - 1,
        )
    }

    /// All tiles covered by the footprint.
    pub fn footprint(&self) -> Vec<Coordinate> {
        self.footprint_at(self.position)
    }

    /// All tiles the footprint would cover at a hypothetical anchor.
    pub fn footprint_at(&self, anchor: Coordinate) -> Vec<Coordinate> {
        let top_left = self.top_left_at(anchor);
        (top_left.y..top_left.y + self.height as i32)
            .flat_map(|y| (top_left.x..top_left.x + self.width as i32).map(move |x| Coordinate::new(x, y)))
            .collect()
    }

    /// Tile directly below the bottom-centre of the footprint.
    pub fn entrance(&self) -> Coordinate {
        Coordinate::new(self.position.x, self.position.y + 1)
    }

    /// Tile in front of the entrance, outside the barrier ring.
    pub fn approach(&self) -> Coordinate {
        Coordinate::new(self.position.x, self.position.y + 2)
    }

    /// Collision radius: half the longer side.
    pub fn radius(&self) -> f64 {
        self.width.max(self.height) as f64 / 2.0
    }

    /// Geometric centre of the footprint at a hypothetical anchor.
    pub fn center_at(&self, anchor: Coordinate) -> (f64, f64) {
        let top_left = self.top_left_at(anchor);
        (
            top_left.x as f64 + self.width as f64 / 2.0,
            top_left.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Geometric centre of the footprint.
    pub fn center(&self) -> (f64, f64) {
        self.center_at(self.position)
    }

    /// Whether the footprint covers a tile.
    pub fn covers(&self, c: Coordinate) -> bool {
        let top_left = self.top_left();
        c.x >= top_left.x
            && c.y >= top_left.y
            && c.x < top_left.x + self.width as i32
            && c.y < top_left.y + self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_creation() {
        let building = PlacedObject::new(ObjectKind::Building { floors: 2 }, Coordinate::new(5, 5), 4, 3);
        assert_eq!(building.width, 4);
        assert_eq!(building.height, 3);
        assert!(building.kind.is_structure());
        assert!(!building.kind.is_dynamic());
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let item = PlacedObject::new(ObjectKind::Item { name: "coin".into() }, Coordinate::origin(), 0, 0);
        assert_eq!((item.width, item.height), (1, 1));
    }

    #[test]
    fn test_footprint_geometry() {
        // Odd width: anchor is the exact centre column
        let shop = PlacedObject::new(ObjectKind::Shop, Coordinate::new(10, 8), 3, 2);
        assert_eq!(shop.top_left(), Coordinate::new(9, 7));
        assert_eq!(shop.bottom_right(), Coordinate::new(11, 8));
        assert!(shop.covers(Coordinate::new(10, 8)));
        assert!(!shop.covers(Coordinate::new(10, 9)));

        // Even width: anchor is the right-of-centre column
        let hall = PlacedObject::new(ObjectKind::Building { floors: 1 }, Coordinate::new(10, 8), 4, 1);
        assert_eq!(hall.top_left(), Coordinate::new(8, 8));
        assert_eq!(hall.bottom_right(), Coordinate::new(11, 8));
    }

    #[test]
    fn test_entrance_and_center() {
        let cave = PlacedObject::new(ObjectKind::Cave { levels: 3 }, Coordinate::new(4, 4), 2, 2);
        assert_eq!(cave.entrance(), Coordinate::new(4, 5));
        assert_eq!(cave.center(), (4.0, 4.0));
        assert_eq!(cave.radius(), 1.0);
    }

    #[test]
    fn test_dynamic_kinds() {
        assert!(PlacedObject::character("hero", Coordinate::origin()).kind.is_dynamic());
        assert!(PlacedObject::enemy("slime", Coordinate::origin()).kind.is_dynamic());
        assert!(!PlacedObject::item("potion", Coordinate::origin()).kind.is_dynamic());
        assert_eq!(PlacedObject::item("potion", Coordinate::origin()).kind.label(), "item");
    }

    #[test]
    fn test_object_id_uniqueness() {
        assert_ne!(new_object_id(), new_object_id());
    }

    #[test]
    fn test_seeded_object_ids() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let a = new_object_id_from_rng(&mut StdRng::seed_from_u64(4));
        let b = new_object_id_from_rng(&mut StdRng::seed_from_u64(4));
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 4);

        let item = PlacedObject::item("gem", Coordinate::origin()).with_id(a);
        assert_eq!(item.id, a);
    }
}
