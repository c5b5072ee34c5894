//! Hex map: coordinates, terrain and the board the counters sit on

pub mod board;
pub mod hex;
pub mod terrain;

pub use board::{Board, Location, LocationKind, Tile};
pub use hex::HexCoord;
pub use terrain::{MovementClass, Terrain, TerrainCosts};
