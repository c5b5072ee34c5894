//! Terrain types and the movement cost table
//!
//! Costs are scenario data: the defaults below follow the printed terrain
//! effects chart, but a scenario may ship its own table.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Terrain types of the strategic map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Grassland,
    Steppe,
    Forest,
    Jungle,
    Mountain,
    Swamp,
    Desert,
    Glacier,
    Ocean,
    Maelstrom,
}

impl Terrain {
    /// Open water, only fleets and flyers may be here
    pub fn is_water(&self) -> bool {
        matches!(self, Terrain::Ocean | Terrain::Maelstrom)
    }

    /// Nothing may enter or end movement here
    pub fn is_impassable(&self) -> bool {
        matches!(self, Terrain::Maelstrom)
    }
}

/// How a unit gets around, derived from its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementClass {
    Land,
    Naval,
    Air,
}

/// Movement point cost to enter a hex, per movement class
///
/// Land costs are looked up by terrain; a terrain missing from the table
/// cannot be entered by land units. Naval and air movement pay a flat cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainCosts {
    pub land: AHashMap<Terrain, u32>,
    pub naval: u32,
    pub air: u32,
}

impl Default for TerrainCosts {
    fn default() -> Self {
        let land = [
            (Terrain::Grassland, 1),
            (Terrain::Steppe, 1),
            (Terrain::Desert, 2),
            (Terrain::Forest, 2),
            (Terrain::Jungle, 3),
            (Terrain::Swamp, 3),
            (Terrain::Glacier, 3),
            (Terrain::Mountain, 4),
        ]
        .into_iter()
        .collect();

        Self {
            land,
            naval: 1,
            air: 1,
        }
    }
}

impl TerrainCosts {
    /// Cost for `class` to enter a hex of `terrain`, or `None` if it cannot
    pub fn entry_cost(&self, class: MovementClass, terrain: Terrain) -> Option<u32> {
        if terrain.is_impassable() {
            return None;
        }
        match class {
            MovementClass::Land => self.land.get(&terrain).copied(),
            MovementClass::Naval => Some(self.naval),
            MovementClass::Air => Some(self.air),
        }
    }
}
