//! # Utilities Module
//!
//! Spatial mathematics and grid pathfinding.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;
