//! Stacks: the ordered counters sharing one hex
//!
//! Order matters. Index 0 is the top of the stack, and the selection cursor
//! walks the members top to bottom. Clicking a stack first selects the
//! whole stack (so its movement range can be highlighted), then each member
//! in turn, wrapping back to the top member.

use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;
use crate::map::hex::HexCoord;
use crate::units::unit::Unit;

/// What a selection step produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    WholeStack,
    Unit(UnitId),
}

/// Where the selection cursor currently points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Idle,
    WholeStack,
    Member(usize),
}

impl Cursor {
    /// Pure transition for a stack of `len` members
    pub fn next(self, len: usize) -> Cursor {
        if len == 0 {
            return Cursor::Idle;
        }
        match self {
            Cursor::Idle => Cursor::WholeStack,
            Cursor::WholeStack => Cursor::Member(0),
            Cursor::Member(i) => Cursor::Member((i + 1) % len),
        }
    }
}

/// Ordered counters on one hex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub hex: HexCoord,
    units: Vec<UnitId>,
    #[serde(default)]
    cursor: Cursor,
}

impl Stack {
    pub fn new(hex: HexCoord) -> Self {
        Self {
            hex,
            units: Vec::new(),
            cursor: Cursor::Idle,
        }
    }

    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, unit: &UnitId) -> bool {
        self.units.contains(unit)
    }

    /// Add a counter at the bottom of the stack
    pub fn push(&mut self, unit: UnitId) {
        if !self.units.contains(&unit) {
            self.units.push(unit);
            self.cursor = Cursor::Idle;
        }
    }

    /// Remove a counter; returns false if it was not here
    pub fn remove(&mut self, unit: &UnitId) -> bool {
        let before = self.units.len();
        self.units.retain(|u| u != unit);
        let removed = self.units.len() != before;
        if removed {
            self.cursor = Cursor::Idle;
        }
        removed
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Advance the selection cursor
    pub fn select_next(&mut self) -> Option<Selection> {
        self.cursor = self.cursor.next(self.units.len());
        self.current_selection()
    }

    pub fn current_selection(&self) -> Option<Selection> {
        match self.cursor {
            Cursor::Idle => None,
            Cursor::WholeStack => Some(Selection::WholeStack),
            Cursor::Member(i) => self.units.get(i).cloned().map(Selection::Unit),
        }
    }

    pub fn reset_selection(&mut self) {
        self.cursor = Cursor::Idle;
    }

    /// Counter shown face up: the selected member, else the top one
    pub fn top(&self) -> Option<&UnitId> {
        match self.cursor {
            Cursor::Member(i) => self.units.get(i),
            _ => self.units.first(),
        }
    }
}

/// A stack moves only as far as its slowest member
///
/// Returns 0 for an empty stack.
pub fn movement_budget<'a>(members: impl IntoIterator<Item = &'a Unit>) -> u32 {
    members
        .into_iter()
        .map(Unit::effective_movement_points)
        .min()
        .unwrap_or(0)
}
