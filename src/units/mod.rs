//! Counters on the board: units, the stacks they form, and where they may go

pub mod model;
pub mod movement;
pub mod stack;
pub mod unit;

pub use model::UnitModel;
pub use movement::{legal_destinations, path_cost};
pub use stack::{movement_budget, Selection, Stack};
pub use unit::{Unit, UnitKind, UnitStatus};
