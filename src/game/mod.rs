//! Players, countries, land combat and the turn structure around the board

pub mod combat;
pub mod country;
pub mod diplomacy;
pub mod phase;
pub mod player;
pub mod state;

pub use combat::{
    apply_combat_result, plan_combat, resolve_combat, CombatModifiers, CombatPlan, CombatReport, CombatResult, CombatTable,
    Odds, SideResult,
};
pub use country::{ActivationRatings, Country};
pub use diplomacy::{build_activation_attempt, resolve_activation, roll_activation, ActivationAttempt, ActivationRoll};
pub use phase::{advance_phase, next_turn, GamePhase};
pub use player::{ArtifactSpec, Player};
pub use state::GameState;
