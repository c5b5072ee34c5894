//! Event resolution engine
//!
//! Each strategic event phase runs `Idle -> Selecting -> Applying -> Idle`.
//! The draw and every effect are applied to staged copies of the pool and
//! the game state; they replace the live values only once the whole event
//! has applied. A failing effect leaves both untouched.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::error::Result;
use crate::core::types::{Allegiance, EventId, Turn};
use crate::events::catalog::EventCatalog;
use crate::events::definition::{describe_effect, EventEffect};
use crate::events::pool::{DrawContext, EventSelector, GameEventPool, UniformSelector};
use crate::game::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    Idle,
    Selecting,
    Applying,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseOutcome {
    /// Nothing eligible; the presentation layer shows its placeholder
    NoEvent,
    Fired { event: EventId, side: Allegiance },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub turn: Turn,
    pub side: Allegiance,
    pub event: EventId,
}

pub struct EventEngine<'c> {
    catalog: &'c EventCatalog,
    selector: Box<dyn EventSelector>,
    phase: EnginePhase,
    history: Vec<FiredEvent>,
}

impl<'c> EventEngine<'c> {
    /// Engine drawing uniformly at random
    pub fn new(catalog: &'c EventCatalog) -> Self {
        Self::with_selector(catalog, Box::new(UniformSelector))
    }

    pub fn with_selector(catalog: &'c EventCatalog, selector: Box<dyn EventSelector>) -> Self {
        Self {
            catalog,
            selector,
            phase: EnginePhase::Idle,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Events fired so far, oldest first
    pub fn history(&self) -> &[FiredEvent] {
        &self.history
    }

    /// Resolve one event phase for the state's active player
    pub fn run_event_phase<R: RngCore>(
        &mut self,
        pool: &mut GameEventPool,
        state: &mut GameState,
        rng: &mut R,
    ) -> Result<PhaseOutcome> {
        let result = self.resolve(pool, state, rng);
        self.phase = EnginePhase::Idle;
        result
    }

    fn resolve<R: RngCore>(
        &mut self,
        pool: &mut GameEventPool,
        state: &mut GameState,
        rng: &mut R,
    ) -> Result<PhaseOutcome> {
        self.phase = EnginePhase::Selecting;
        let side = state.active_player;
        let turn = state.turn;

        let mut staged_pool = pool.clone();
        let def = {
            let ctx = DrawContext::new(turn, side).with_player(state.player(side)?);
            if !staged_pool.has_eligible(self.catalog, &ctx) {
                info!(turn, side = %side, "No strategic event this phase");
                return Ok(PhaseOutcome::NoEvent);
            }
            staged_pool.draw_and_consume(self.catalog, &ctx, self.selector.as_ref(), rng)?
        };

        self.phase = EnginePhase::Applying;
        let mut staged_state = state.clone();
        for effect in &def.effects {
            if let Err(err) = apply_effect(self.catalog, &mut staged_pool, &mut staged_state, side, effect) {
                warn!(event = %def.id, error = %err, "Event rolled back");
                return Err(err);
            }
            debug!(event = %def.id, effect = %describe_effect(effect), "Effect applied");
        }

        *pool = staged_pool;
        *state = staged_state;
        self.history.push(FiredEvent {
            turn,
            side,
            event: def.id.clone(),
        });
        info!(turn, side = %side, event = %def.id, "Strategic event fired");

        Ok(PhaseOutcome::Fired { event: def.id, side })
    }
}

/// Apply one effect on behalf of `side`
pub fn apply_effect(
    catalog: &EventCatalog,
    pool: &mut GameEventPool,
    state: &mut GameState,
    side: Allegiance,
    effect: &EventEffect,
) -> Result<()> {
    match effect {
        EventEffect::Alliance { country } => {
            let entry = state.country(country)?;
            if entry.is_neutral() {
                state.activate_country(country, side)?;
            } else {
                warn!(country = %country, allegiance = %entry.allegiance, "Alliance with a country already at war ignored");
            }
        }
        EventEffect::AddUnits { units } => {
            for id in units {
                state.units.ready_unit(id, side)?;
            }
        }
        EventEffect::GrantArtifact { artifact } => state.grant_artifact(side, artifact)?,
        EventEffect::GrantPrerequisite { prerequisite } => {
            state.player_mut(side)?.add_prerequisite(prerequisite.clone());
        }
        EventEffect::CombatBonus { amount } => state.add_combat_bonus(side, *amount),
        EventEffect::ActivationBonus { amount } => state.add_activation_bonus(side, *amount),
        EventEffect::UnlockEvents { events } => {
            for spec in events {
                pool.unlock(catalog, spec)?;
            }
        }
        EventEffect::BanEvents { events } => {
            for id in events {
                catalog.lookup(id)?;
                pool.ban(id);
            }
        }
        EventEffect::AlignmentShift {
            country,
            whitestone,
            highlord,
        } => state.country_mut(country)?.shift_activation(*whitestone, *highlord),
    }
    Ok(())
}
