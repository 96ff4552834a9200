//! # Tile Kinds
//!
//! Closed tile enumerations for each grid kind.
//!
//! Every grid kind owns its own enumeration plus a "max walkable" threshold:
//! a tile is traversable iff its numeric value is at or below the threshold.
//! Values are therefore ordered walkable-first.

use crate::TerraError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;

/// The three kinds of environment a grid can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKind {
    World,
    Building,
    Cave,
}

impl GridKind {
    /// Lower-case name used by the CLI and in log output.
    pub fn name(self) -> &'static str {
        match self {
            GridKind::World => "world",
            GridKind::Building => "building",
            GridKind::Cave => "cave",
        }
    }
}

impl FromStr for GridKind {
    type Err = TerraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "world" => Ok(GridKind::World),
            "building" => Ok(GridKind::Building),
            "cave" => Ok(GridKind::Cave),
            other => Err(TerraError::InvalidGridKind(other.to_string())),
        }
    }
}

/// Behaviour shared by the per-kind tile enumerations.
pub trait TileKind: Copy + Eq + Debug + Serialize + DeserializeOwned + 'static {
    /// Grid kind this enumeration belongs to.
    const GRID_KIND: GridKind;

    /// Highest numeric tile value that is still traversable.
    const MAX_WALKABLE: u8;

    /// Numeric value of the tile.
    fn value(self) -> u8;

    /// Decodes a numeric value back into a tile.
    fn from_value(value: u8) -> Option<Self>;

    /// Tile a freshly created grid of this kind is filled with.
    fn empty() -> Self;

    /// Tile used to wall off placed objects.
    fn barrier() -> Self;

    /// Tiles an object may be placed on when the caller passes no whitelist.
    fn default_whitelist() -> &'static [Self];

    /// Single character used by ASCII dumps.
    fn glyph(self) -> char;

    /// Whether the tile is traversable under the kind's own threshold.
    fn is_walkable(self) -> bool {
        self.value() <= Self::MAX_WALKABLE
    }

    /// Whether the tile is traversable under a caller-supplied threshold.
    fn is_walkable_under(self, max_walkable: u8) -> bool {
        self.value() <= max_walkable
    }

    /// Decodes a numeric value, reporting unknown values as errors.
    fn try_from_value(value: u8) -> Result<Self, TerraError> {
        Self::from_value(value).ok_or_else(|| TerraError::InvalidTile {
            kind: Self::GRID_KIND,
            value,
        })
    }
}

/// Tile kinds that the maze digger can emit.
pub trait MazeTiles: TileKind {
    /// Undug rock.
    fn nothing() -> Self;
    /// Dug, walkable floor.
    fn ground() -> Self;
    /// Enclosing wall around dug floor.
    fn wall() -> Self;
}

/// Overworld terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldTile {
    Grass = 0,
    Sand = 1,
    Ground = 2,
    Road = 3,
    Cave = 4,
    Tree = 5,
    Water = 6,
    Mountain = 7,
}

impl TileKind for WorldTile {
    const GRID_KIND: GridKind = GridKind::World;
    const MAX_WALKABLE: u8 = WorldTile::Cave as u8;

    fn value(self) -> u8 {
        self as u8
    }

    fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(WorldTile::Grass),
            1 => Some(WorldTile::Sand),
            2 => Some(WorldTile::Ground),
            3 => Some(WorldTile::Road),
            4 => Some(WorldTile::Cave),
            5 => Some(WorldTile::Tree),
            6 => Some(WorldTile::Water),
            7 => Some(WorldTile::Mountain),
            _ => None,
        }
    }

    fn empty() -> Self {
        WorldTile::Grass
    }

    fn barrier() -> Self {
        WorldTile::Tree
    }

    fn default_whitelist() -> &'static [Self] {
        &[WorldTile::Ground, WorldTile::Sand]
    }

    fn glyph(self) -> char {
        match self {
            WorldTile::Grass => '.',
            WorldTile::Sand => ':',
            WorldTile::Ground => ',',
            WorldTile::Road => '=',
            WorldTile::Cave => 'O',
            WorldTile::Tree => 'T',
            WorldTile::Water => '~',
            WorldTile::Mountain => '^',
        }
    }
}

/// Building floor terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingTile {
    Ground = 0,
    Stairs = 1,
    Wall = 2,
    Nothing = 3,
}

impl TileKind for BuildingTile {
    const GRID_KIND: GridKind = GridKind::Building;
    const MAX_WALKABLE: u8 = BuildingTile::Stairs as u8;

    fn value(self) -> u8 {
        self as u8
    }

    fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(BuildingTile::Ground),
            1 => Some(BuildingTile::Stairs),
            2 => Some(BuildingTile::Wall),
            3 => Some(BuildingTile::Nothing),
            _ => None,
        }
    }

    fn empty() -> Self {
        BuildingTile::Nothing
    }

    fn barrier() -> Self {
        BuildingTile::Wall
    }

    fn default_whitelist() -> &'static [Self] {
        &[BuildingTile::Ground]
    }

    fn glyph(self) -> char {
        match self {
            BuildingTile::Ground => '.',
            BuildingTile::Stairs => '>',
            BuildingTile::Wall => '#',
            BuildingTile::Nothing => ' ',
        }
    }
}

impl MazeTiles for BuildingTile {
    fn nothing() -> Self {
        BuildingTile::Nothing
    }

    fn ground() -> Self {
        BuildingTile::Ground
    }

    fn wall() -> Self {
        BuildingTile::Wall
    }
}

/// Cave level terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaveTile {
    Ground = 0,
    Tunnel = 1,
    Wall = 2,
    Nothing = 3,
}

impl TileKind for CaveTile {
    const GRID_KIND: GridKind = GridKind::Cave;
    const MAX_WALKABLE: u8 = CaveTile::Tunnel as u8;

    fn value(self) -> u8 {
        self as u8
    }

    fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(CaveTile::Ground),
            1 => Some(CaveTile::Tunnel),
            2 => Some(CaveTile::Wall),
            3 => Some(CaveTile::Nothing),
            _ => None,
        }
    }

    fn empty() -> Self {
        CaveTile::Nothing
    }

    fn barrier() -> Self {
        CaveTile::Wall
    }

    fn default_whitelist() -> &'static [Self] {
        &[CaveTile::Ground]
    }

    fn glyph(self) -> char {
        match self {
            CaveTile::Ground => '.',
            CaveTile::Tunnel => 'o',
            CaveTile::Wall => '#',
            CaveTile::Nothing => ' ',
        }
    }
}

impl MazeTiles for CaveTile {
    fn nothing() -> Self {
        CaveTile::Nothing
    }

    fn ground() -> Self {
        CaveTile::Ground
    }

    fn wall() -> Self {
        CaveTile::Wall
    }
}
