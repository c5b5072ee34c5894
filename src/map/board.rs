//! The strategic board: hex tiles, special locations and occupancy rules
//!
//! The board answers terrain questions only. Who stands where lives in
//! [`crate::units::UnitModel`].

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::CountryId;
use crate::map::hex::HexCoord;
use crate::map::terrain::{MovementClass, Terrain};

/// Kind of special location printed on a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    City,
    Port,
    Fortress,
    Capital,
    Undercity,
}

/// A named location (city, port, fortress) on a hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub kind: LocationKind,
}

/// A single hex tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: Terrain,
    /// Explicit coastal flag from map data. `None` means "derive it from
    /// adjacency to water".
    #[serde(default)]
    pub coastal: Option<bool>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub country: Option<CountryId>,
}

impl Tile {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            coastal: None,
            location: None,
            country: None,
        }
    }

    pub fn with_coastal(mut self, coastal: bool) -> Self {
        self.coastal = Some(coastal);
        self
    }

    pub fn with_location(mut self, id: &str, kind: LocationKind) -> Self {
        self.location = Some(Location {
            id: id.to_string(),
            kind,
        });
        self
    }

    pub fn with_country(mut self, country: impl Into<CountryId>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn is_port(&self) -> bool {
        matches!(
            self.location,
            Some(Location {
                kind: LocationKind::Port,
                ..
            })
        )
    }
}

/// The board containing all hex tiles
#[derive(Debug, Clone, Default)]
pub struct Board {
    tiles: AHashMap<HexCoord, Tile>,
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangular board of `width` x `height` offset hexes, all one terrain
    pub fn filled(width: i32, height: i32, terrain: Terrain) -> Self {
        let mut board = Self::new();
        for row in 0..height {
            for col in 0..width {
                board.insert(Tile::new(HexCoord::from_offset(col, row), terrain));
            }
        }
        board
    }

    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        let mut board = Self::new();
        for tile in tiles {
            board.insert(tile);
        }
        board
    }

    /// Insert or replace the tile at its coordinate
    pub fn insert(&mut self, tile: Tile) {
        self.tiles.insert(tile.coord, tile);
    }

    pub fn tile(&self, coord: &HexCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    pub fn tile_mut(&mut self, coord: &HexCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(coord)
    }

    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.tiles.contains_key(coord)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        match self.tiles.get_mut(&coord) {
            Some(tile) => tile.terrain = terrain,
            None => self.insert(Tile::new(coord, terrain)),
        }
    }

    pub fn terrain(&self, coord: &HexCoord) -> Option<Terrain> {
        self.tiles.get(coord).map(|t| t.terrain)
    }

    pub fn is_water(&self, coord: &HexCoord) -> bool {
        self.terrain(coord).map(|t| t.is_water()).unwrap_or(false)
    }

    /// Neighbors that exist on this board
    pub fn neighbors(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.contains(n))
            .collect()
    }

    /// Coastal rule: a land hex is coastal when map data flags it so, or,
    /// absent a flag, when at least one neighbor is water. An explicit
    /// `coastal: false` wins over adjacency, so a port printed inland (on a
    /// lake or river mouth the counters cannot reach) is not coastal.
    /// Water hexes are never coastal.
    pub fn is_coastal(&self, coord: &HexCoord) -> bool {
        let Some(tile) = self.tiles.get(coord) else {
            return false;
        };
        if tile.terrain.is_water() {
            return false;
        }
        match tile.coastal {
            Some(flag) => flag,
            None => coord.neighbors().iter().any(|n| self.is_water(n)),
        }
    }

    pub fn is_port(&self, coord: &HexCoord) -> bool {
        self.tiles.get(coord).map(Tile::is_port).unwrap_or(false)
    }

    /// Whether a unit of `class` may stand on this hex at all
    ///
    /// - land units: any non-water hex
    /// - fleets: open water, or a coastal land hex
    /// - flyers: any non-water hex (they must land to end movement)
    ///
    /// Maelstrom hexes and hexes off the board accept nobody.
    pub fn can_occupy(&self, class: MovementClass, coord: &HexCoord) -> bool {
        let Some(tile) = self.tiles.get(coord) else {
            return false;
        };
        if tile.terrain.is_impassable() {
            return false;
        }
        match class {
            MovementClass::Land | MovementClass::Air => !tile.terrain.is_water(),
            MovementClass::Naval => tile.terrain.is_water() || self.is_coastal(coord),
        }
    }

    /// Whether a unit of `class` may pass through this hex mid-move
    ///
    /// Flyers may overfly water; everyone else must be able to stand there.
    pub fn can_traverse(&self, class: MovementClass, coord: &HexCoord) -> bool {
        match class {
            MovementClass::Air => self
                .terrain(coord)
                .map(|t| !t.is_impassable())
                .unwrap_or(false),
            _ => self.can_occupy(class, coord),
        }
    }

    /// Country owning the hex, if any
    pub fn country_at(&self, coord: &HexCoord) -> Option<&CountryId> {
        self.tiles.get(coord).and_then(|t| t.country.as_ref())
    }
}
