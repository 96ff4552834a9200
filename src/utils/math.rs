//! # Spatial Mathematics
//!
//! Small geometric and probabilistic helpers shared by generation and placement.

use crate::{Coordinate, PlacedObject};
use rand::Rng;

/// Whether two circles overlap (touching edges do not count).
pub fn circles_overlap(a: (f64, f64), radius_a: f64, b: (f64, f64), radius_b: f64) -> bool {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt() < radius_a + radius_b
}

/// Whether `object`, if anchored at `anchor`, overlaps `other` by bounding circle.
pub fn object_overlaps_at(object: &PlacedObject, anchor: Coordinate, other: &PlacedObject) -> bool {
    circles_overlap(
        object.center_at(anchor),
        object.radius(),
        other.center(),
        other.radius(),
    )
}

/// Draws a uniform value in `[0, 1)` and reports whether it exceeds `threshold`.
///
/// A threshold of 0.75 therefore succeeds roughly a quarter of the time.
pub fn roll_exceeds<R: Rng + ?Sized>(rng: &mut R, threshold: f64) -> bool {
    rng.gen::<f64>() > threshold
}

/// Clamps a value into `[min, max]`, preferring `min` when the range is empty.
pub fn clamp_i32(value: i32, min: i32, max: i32) -> i32 {
    if max < min {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap((0.0, 0.0), 1.0, (1.5, 0.0), 1.0));
        assert!(!circles_overlap((0.0, 0.0), 1.0, (2.0, 0.0), 1.0));
        assert!(!circles_overlap((0.0, 0.0), 0.5, (3.0, 4.0), 4.0));
    }

    #[test]
    fn test_object_overlap() {
        let placed = PlacedObject::new(ObjectKind::Shop, Coordinate::new(10, 10), 4, 4);
        let candidate = PlacedObject::new(ObjectKind::Shop, Coordinate::origin(), 2, 2);
        assert!(object_overlaps_at(&candidate, Coordinate::new(11, 10), &placed));
        assert!(!object_overlaps_at(&candidate, Coordinate::new(20, 20), &placed));
    }

    #[test]
    fn test_roll_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(!roll_exceeds(&mut rng, 1.0));
            assert!(roll_exceeds(&mut rng, -0.1));
        }
    }

    #[test]
    fn test_clamp_i32() {
        assert_eq!(clamp_i32(5, 0, 3), 3);
        assert_eq!(clamp_i32(-2, 0, 3), 0);
        assert_eq!(clamp_i32(2, 4, 1), 4);
    }
}
