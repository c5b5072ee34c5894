//! Diplomatic activation of neutral countries
//!
//! The acting side rolls a die against the country's rating for that side.
//! Event activation bonuses are subtracted from the roll; the effective roll
//! never drops below 1, so a rating of 0 can never be met.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::RulesConfig;
use crate::core::error::{GloryError, Result};
use crate::core::types::{Allegiance, CountryId};
use crate::game::state::GameState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationAttempt {
    pub country: CountryId,
    pub side: Allegiance,
    pub whitestone_rating: i32,
    pub highlord_rating: i32,
    /// Roll modifier from strategic events
    pub event_bonus: i32,
    pub target_rating: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRoll {
    pub roll: u32,
    pub effective_roll: i32,
    pub bonus_applied: i32,
    pub success: bool,
}

/// Gather everything needed to roll for `country` on behalf of `side`
pub fn build_activation_attempt(
    state: &GameState,
    country: &CountryId,
    side: Allegiance,
) -> Result<ActivationAttempt> {
    let entry = state.country(country)?;
    if !entry.is_neutral() {
        return Err(GloryError::NotNeutral(country.clone()));
    }
    if side.is_neutral() {
        return Err(GloryError::UnknownPlayer(side.to_string()));
    }

    Ok(ActivationAttempt {
        country: entry.id.clone(),
        side,
        whitestone_rating: entry.activation.whitestone,
        highlord_rating: entry.activation.highlord,
        event_bonus: state.activation_bonus(side),
        target_rating: entry.activation.for_side(side),
    })
}

/// Roll the activation die
pub fn roll_activation<R: Rng + ?Sized>(
    target_rating: i32,
    bonus: i32,
    die_sides: u32,
    rng: &mut R,
) -> ActivationRoll {
    let roll = rng.gen_range(1..=die_sides.max(1));
    let effective_roll = (roll as i32 - bonus).max(1);
    ActivationRoll {
        roll,
        effective_roll,
        bonus_applied: bonus,
        success: effective_roll <= target_rating,
    }
}

/// Attempt to bring `country` into the war for `side`
///
/// On success the country's allegiance changes and its units become ready
/// for deployment.
pub fn resolve_activation<R: Rng + ?Sized>(
    state: &mut GameState,
    country: &CountryId,
    side: Allegiance,
    config: &RulesConfig,
    rng: &mut R,
) -> Result<ActivationRoll> {
    let attempt = build_activation_attempt(state, country, side)?;
    let result = roll_activation(
        attempt.target_rating,
        attempt.event_bonus,
        config.activation_die_sides,
        rng,
    );

    info!(
        country = %country,
        side = %side,
        roll = result.roll,
        effective = result.effective_roll,
        target = attempt.target_rating,
        success = result.success,
        "Activation roll"
    );

    if result.success {
        state.activate_country(country, side)?;
    }
    Ok(result)
}
