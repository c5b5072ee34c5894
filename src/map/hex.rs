//! Hex coordinate system (axial coordinates)
//!
//! Uses axial coordinates (q, r) for neighbor and distance math. Map data and
//! the printed board use "odd-r" offset coordinates (col, row), so both
//! conversions are provided.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Build from odd-r offset coordinates (col, row)
    pub fn from_offset(col: i32, row: i32) -> Self {
        let q = col - (row - (row & 1)) / 2;
        Self::new(q, row)
    }

    /// Convert to odd-r offset coordinates (col, row)
    pub fn to_offset(&self) -> (i32, i32) {
        let col = self.q + (self.r - (self.r & 1)) / 2;
        (col, self.r)
    }

    /// Distance in hex steps
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.distance(other) == 1
    }
}

impl fmt::Display for HexCoord {
    /// Printed as the four-digit board label, e.g. `0712`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (col, row) = self.to_offset();
        write!(f, "{:02}{:02}", col, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_distance_same() {
        let a = HexCoord::new(0, 0);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let center = HexCoord::new(3, -2);
        for n in center.neighbors() {
            assert_eq!(center.distance(&n), 1);
        }
    }

    #[test]
    fn test_offset_round_trip_on_odd_and_even_rows() {
        for (col, row) in [(0, 0), (5, 1), (7, 12), (64, 52), (3, 3)] {
            let hex = HexCoord::from_offset(col, row);
            assert_eq!(hex.to_offset(), (col, row));
        }
    }

    #[test]
    fn test_odd_row_shift() {
        // On an odd row the offset column sits half a hex to the right
        assert_eq!(HexCoord::from_offset(1, 1), HexCoord::new(1, 1));
        assert_eq!(HexCoord::from_offset(1, 2), HexCoord::new(0, 2));
    }

    #[test]
    fn test_display_uses_board_label() {
        assert_eq!(HexCoord::from_offset(7, 12).to_string(), "0712");
    }
}
