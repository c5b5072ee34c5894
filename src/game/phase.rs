//! Battle turn sequence
//!
//! Each turn runs Replacements, Strategic Events, Activation, Initiative,
//! then Movement and Combat for the first player followed by Movement and
//! Combat for the second. Exactly one phase is active at a time and a phase
//! only ends once its mutations are committed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::Allegiance;
use crate::game::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Initial setup, replaces the pre-movement phases of the first turn
    Deployment,
    Replacements,
    StrategicEvents,
    Activation,
    Initiative,
    Movement,
    Combat,
}

impl GamePhase {
    /// Phases that resolve without player input
    pub fn is_automatic(&self) -> bool {
        matches!(
            self,
            GamePhase::StrategicEvents | GamePhase::Activation | GamePhase::Initiative
        )
    }
}

fn other_side(side: Allegiance) -> Allegiance {
    side.opponent().unwrap_or(Allegiance::Highlord)
}

/// Move the state machine one step
///
/// Replacements and Activation are played loser first, Strategic Events
/// winner first; each of those phases closes once both sides have acted.
pub fn advance_phase(state: &mut GameState) {
    let winner = state.initiative_winner;
    let from = state.phase;

    match state.phase {
        GamePhase::Deployment => {
            if state.active_player != winner {
                state.active_player = winner;
            } else {
                state.phase = GamePhase::Movement;
                state.second_player_has_acted = false;
            }
        }
        GamePhase::Replacements => {
            if state.active_player != winner {
                state.active_player = winner;
            } else {
                state.phase = GamePhase::StrategicEvents;
            }
        }
        GamePhase::StrategicEvents => {
            if state.active_player == winner {
                state.active_player = other_side(winner);
            } else {
                state.phase = GamePhase::Activation;
            }
        }
        GamePhase::Activation => {
            if state.active_player != winner {
                state.active_player = winner;
            } else {
                state.activation_bonuses.clear();
                state.phase = GamePhase::Initiative;
            }
        }
        GamePhase::Initiative => {
            state.phase = GamePhase::Movement;
            state.second_player_has_acted = false;
        }
        GamePhase::Movement => {
            state.units.refresh_movement();
            state.phase = GamePhase::Combat;
        }
        GamePhase::Combat => {
            state.combat_bonuses.remove(&state.active_player);
            if !state.second_player_has_acted {
                state.phase = GamePhase::Movement;
                state.active_player = other_side(state.active_player);
                state.second_player_has_acted = true;
            } else {
                next_turn(state);
            }
        }
    }

    debug!(from = ?from, to = ?state.phase, active = %state.active_player, "Advanced phase");
}

/// Start the next turn; the initiative loser opens Replacements
pub fn next_turn(state: &mut GameState) {
    state.turn += 1;
    state.phase = GamePhase::Replacements;
    state.active_player = other_side(state.initiative_winner);
    state.second_player_has_acted = false;
    state.units.refresh_movement();
}
