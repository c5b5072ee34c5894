//! Dragons of Glory - hex-and-counter wargame engine
//!
//! Units and stacks on a hex board, countries drawn into the war by
//! diplomacy, and a scenario-driven pool of strategic events.

pub mod core;
pub mod events;
pub mod game;
pub mod map;
pub mod scenario;
pub mod units;
