//! # Terrasim
//!
//! A deterministic spatial simulation engine for tile-based game worlds.
//!
//! ## Architecture Overview
//!
//! The engine only produces and consumes plain data (terrain arrays,
//! coordinates, object lists). Rendering, UI state and persistence belong to
//! the host. The core pieces, leaf first:
//!
//! - **Terrain Generation**: diffusion growth and room-and-corridor maze digging
//! - **Placement**: finds non-overlapping anchors for buildings, shops, caves and items
//! - **Pathfinding**: A* routes over tiles at or below a walkability threshold
//! - **Occupancy**: O(1) lookup of which dynamic object stands on which tile
//!
//! Every call runs to completion on the calling thread. A grid is owned by one
//! [`Environment`] and all mutation goes through `&mut` access, so the host
//! serialises terrain and occupancy updates by construction.

pub mod generation;
pub mod occupancy;
pub mod placement;
pub mod utils;
pub mod world;

// Core module re-exports
pub use generation::*;
pub use occupancy::*;
pub use placement::*;
pub use utils::*;
pub use world::*;

/// Core error type for the Terrasim engine.
///
/// Exhausted searches and unreachable targets are not errors; they come back
/// as `None` or an empty path.
#[derive(thiserror::Error, Debug)]
pub enum TerraError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A coordinate fell outside the grid
    #[error("Coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// Grid dimensions and terrain disagree
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A raw tile value is not part of the grid kind's enumeration
    #[error("Tile value {value} is not a valid {kind:?} tile")]
    InvalidTile { kind: GridKind, value: u8 },

    /// Unknown environment type name
    #[error("Unknown grid kind: {0}")]
    InvalidGridKind(String),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// No object with this ID lives in the environment
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),
}

/// Result type used throughout the Terrasim codebase.
pub type TerraResult<T> = Result<T, TerraError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default world width in tiles
    pub const DEFAULT_WORLD_WIDTH: u32 = 96;

    /// Default world height in tiles
    pub const DEFAULT_WORLD_HEIGHT: u32 = 64;

    /// Default building floor / cave level width in tiles
    pub const DEFAULT_INTERIOR_WIDTH: u32 = 40;

    /// Default building floor / cave level height in tiles
    pub const DEFAULT_INTERIOR_HEIGHT: u32 = 30;

    /// Candidate anchors tried by the placement resolver before giving up
    pub const PLACEMENT_RETRY_BUDGET: u32 = 64;

    /// Tiles around a footprint that must also be whitelisted
    pub const PLACEMENT_PADDING: u32 = 1;

    /// Ring expansions tried by the nearest-free occupancy search
    pub const OCCUPANCY_RETRY_BUDGET: u32 = 5;

    /// Neighbourhood radius used by diffusion growth (1 = 3x3)
    pub const GROWTH_RADIUS: u32 = 1;

    /// Digging attempts allowed per maze
    pub const MAZE_ITERATION_BUDGET: u32 = 5_000;
}
