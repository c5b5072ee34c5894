//! Game event pool
//!
//! The mutable per-session list of events that may still fire. Entries with
//! no occurrences left are removed outright, so every entry in the pool has
//! at least one occurrence remaining. Banned ids never re-enter the pool.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::core::config::RulesConfig;
use crate::core::error::{GloryError, Result};
use crate::core::types::{Allegiance, EventId, Turn};
use crate::events::catalog::EventCatalog;
use crate::events::definition::{EventDefinition, OccurrencePolicy, UnlockSpec};
use crate::events::rules::{ActiveEventsAdjustment, OccurrenceAdjustment, PossibleEventsFilter, ScenarioEventRules};
use crate::game::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remaining {
    Finite(u32),
    Unbounded,
}

impl Remaining {
    /// Remaining count for a policy, `None` for events that never fire
    pub fn from_policy(policy: OccurrencePolicy) -> Option<Self> {
        match policy.initial_count() {
            Some(0) => None,
            Some(n) => Some(Remaining::Finite(n)),
            None => Some(Remaining::Unbounded),
        }
    }

    fn combine(self, other: Remaining) -> Remaining {
        match (self, other) {
            (Remaining::Finite(a), Remaining::Finite(b)) => Remaining::Finite(a.saturating_add(b)),
            _ => Remaining::Unbounded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub event_id: EventId,
    pub remaining: Remaining,
    pub times_fired: u32,
}

/// Who is drawing, and when
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub turn: Turn,
    pub side: Allegiance,
    /// Holdings checked against event requirements; without a player only
    /// events with no requirements are eligible
    pub player: Option<&'a Player>,
}

impl<'a> DrawContext<'a> {
    pub fn new(turn: Turn, side: Allegiance) -> Self {
        Self {
            turn,
            side,
            player: None,
        }
    }

    pub fn with_player(mut self, player: &'a Player) -> Self {
        self.player = Some(player);
        self
    }
}

/// Picks one of the eligible candidates
pub trait EventSelector {
    fn select(&self, candidates: &[&EventDefinition], ctx: &DrawContext<'_>, rng: &mut dyn RngCore) -> Option<usize>;
}

/// Every eligible event is equally likely
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelector;

impl EventSelector for UniformSelector {
    fn select(&self, candidates: &[&EventDefinition], _ctx: &DrawContext<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(rng.gen_range(0..candidates.len()))
    }
}

/// Draw weighted by probability, fading for events whose turn has passed
#[derive(Debug, Clone, Copy)]
pub struct WeightedSelector {
    pub turn_decay_factor: f64,
    pub default_probability: f64,
}

impl WeightedSelector {
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            turn_decay_factor: config.turn_decay_factor,
            default_probability: config.default_probability,
        }
    }

    pub fn weight(&self, def: &EventDefinition, turn: Turn) -> f64 {
        let late = def.turn.map_or(0, |t| turn.saturating_sub(t));
        let probability = def.probability.unwrap_or(self.default_probability);
        probability / (1.0 + self.turn_decay_factor * f64::from(late))
    }
}

impl Default for WeightedSelector {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

impl EventSelector for WeightedSelector {
    fn select(&self, candidates: &[&EventDefinition], ctx: &DrawContext<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        let weights: Vec<f64> = candidates.iter().map(|def| self.weight(def, ctx.turn)).collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        Some(dist.sample(rng))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEventPool {
    entries: Vec<PoolEntry>,
    banned: BTreeSet<EventId>,
}

impl GameEventPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the starting pool: `possible_events` filter first, then bans,
    /// then each `active_events` adjustment in order
    pub fn initialize(catalog: &EventCatalog, rules: &ScenarioEventRules) -> Result<Self> {
        for id in &rules.banned {
            catalog.lookup(id)?;
        }
        let mut pool = Self {
            entries: Vec::new(),
            banned: rules.banned.clone(),
        };

        match &rules.possible {
            PossibleEventsFilter::Unspecified => {
                for def in catalog.iter() {
                    pool.insert(&def.id, def.policy());
                }
            }
            PossibleEventsFilter::ExplicitNone => {}
            PossibleEventsFilter::Only(listed) => {
                let mut seen = BTreeSet::new();
                for possible in listed {
                    let def = catalog.lookup(&possible.event_id)?;
                    if !seen.insert(&possible.event_id) {
                        return Err(GloryError::invalid_rule(
                            format!("possible_events.{}", possible.event_id),
                            "listed more than once",
                        ));
                    }
                    let max = possible.occurrences.or(def.max_occurrences);
                    pool.insert(&def.id, OccurrencePolicy::from_max_occurrences(max));
                }
            }
        }

        for adjustment in &rules.active {
            catalog.lookup(&adjustment.event_id)?;
            pool.adjust(adjustment);
        }

        debug!(entries = pool.len(), banned = pool.banned.len(), "Event pool initialized");
        Ok(pool)
    }

    fn insert(&mut self, id: &EventId, policy: OccurrencePolicy) {
        if self.banned.contains(id) {
            debug!(event = %id, "Skipping banned event");
            return;
        }
        if let Some(remaining) = Remaining::from_policy(policy) {
            self.entries.push(PoolEntry {
                event_id: id.clone(),
                remaining,
                times_fired: 0,
            });
        }
    }

    fn position(&self, id: &EventId) -> Option<usize> {
        self.entries.iter().position(|e| &e.event_id == id)
    }

    /// True when no entry is left at all
    ///
    /// A non-empty pool may still have nothing drawable this phase (turn
    /// gates, allegiance, requirements); check `has_eligible` before
    /// calling `draw_and_consume`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.position(id).is_some()
    }

    pub fn remaining(&self, id: &EventId) -> Option<Remaining> {
        self.position(id).map(|i| self.entries[i].remaining)
    }

    pub fn is_banned(&self, id: &EventId) -> bool {
        self.banned.contains(id)
    }

    pub fn banned(&self) -> impl Iterator<Item = &EventId> {
        self.banned.iter()
    }

    /// Whether `def` may be drawn in `ctx`
    ///
    /// The side must match the event's allegiance (if any) and the player
    /// must hold every requirement. Auto-triggered events are eligible only
    /// while a trigger is met; others only from their `turn` onwards.
    pub fn is_eligible(&self, def: &EventDefinition, ctx: &DrawContext<'_>) -> bool {
        if self.banned.contains(&def.id) {
            return false;
        }
        if def.allegiance.is_some_and(|side| side != ctx.side) {
            return false;
        }
        let requirements_met = match ctx.player {
            Some(player) => def.requirements.iter().all(|r| player.holds(r)),
            None => def.requirements.is_empty(),
        };
        if !requirements_met {
            return false;
        }
        if def.is_auto_triggered() {
            def.trigger_met(ctx.turn)
        } else {
            def.turn.map_or(true, |t| ctx.turn >= t)
        }
    }

    fn eligible<'c>(&self, catalog: &'c EventCatalog, ctx: &DrawContext<'_>) -> Vec<(usize, &'c EventDefinition)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| catalog.lookup(&entry.event_id).ok().map(|def| (i, def)))
            .filter(|(_, def)| self.is_eligible(def, ctx))
            .collect()
    }

    pub fn has_eligible(&self, catalog: &EventCatalog, ctx: &DrawContext<'_>) -> bool {
        !self.eligible(catalog, ctx).is_empty()
    }

    /// Pick one eligible event, consume one occurrence and return its definition
    ///
    /// Auto-triggered events whose trigger is met are taken first, in pool
    /// order; otherwise `selector` chooses among the eligible entries.
    pub fn draw_and_consume(
        &mut self,
        catalog: &EventCatalog,
        ctx: &DrawContext<'_>,
        selector: &dyn EventSelector,
        rng: &mut dyn RngCore,
    ) -> Result<EventDefinition> {
        let candidates = self.eligible(catalog, ctx);
        if candidates.is_empty() {
            return Err(GloryError::EmptyPool);
        }

        let chosen = match candidates.iter().find(|(_, def)| def.is_auto_triggered()) {
            Some(&(i, def)) => (i, def),
            None => {
                let defs: Vec<&EventDefinition> = candidates.iter().map(|(_, def)| *def).collect();
                let pick = selector.select(&defs, ctx, rng).ok_or(GloryError::EmptyPool)?;
                *candidates.get(pick).ok_or(GloryError::EmptyPool)?
            }
        };

        let (index, def) = chosen;
        self.consume_at(index);
        Ok(def.clone())
    }

    /// Record one firing of `id`; returns false when it is not in the pool
    pub fn consume(&mut self, id: &EventId) -> bool {
        match self.position(id) {
            Some(i) => {
                self.consume_at(i);
                true
            }
            None => false,
        }
    }

    fn consume_at(&mut self, index: usize) {
        let entry = &mut self.entries[index];
        entry.times_fired += 1;
        if let Remaining::Finite(n) = entry.remaining {
            let left = n.saturating_sub(1);
            entry.remaining = Remaining::Finite(left);
            if left == 0 {
                let entry = self.entries.remove(index);
                debug!(event = %entry.event_id, "Event exhausted");
            }
        }
    }

    /// Apply one `active_events` adjustment
    ///
    /// Counts never affect unbounded entries; `All` removes and bans.
    pub fn adjust(&mut self, adjustment: &ActiveEventsAdjustment) {
        let id = &adjustment.event_id;
        match adjustment.adjustment {
            OccurrenceAdjustment::All => self.ban(id),
            OccurrenceAdjustment::Count(n) => {
                let Some(i) = self.position(id) else {
                    warn!(event = %id, "active_events entry names an event outside the pool");
                    return;
                };
                let remaining = self.entries[i].remaining;
                match remaining {
                    Remaining::Finite(left) if left <= n => {
                        self.entries.remove(i);
                    }
                    Remaining::Finite(left) => self.entries[i].remaining = Remaining::Finite(left - n),
                    Remaining::Unbounded => debug!(event = %id, "Count ignored for unbounded event"),
                }
            }
        }
    }

    /// Make an event possible again, adding to any occurrences it still has
    pub fn unlock(&mut self, catalog: &EventCatalog, spec: &UnlockSpec) -> Result<()> {
        let def = catalog.lookup(&spec.id)?;
        if self.banned.contains(&def.id) {
            debug!(event = %def.id, "Banned event stays out of the pool");
            return Ok(());
        }
        let policy = OccurrencePolicy::from_max_occurrences(spec.occurrences.or(def.max_occurrences));
        let Some(added) = Remaining::from_policy(policy) else {
            return Ok(());
        };
        match self.position(&def.id) {
            Some(i) => self.entries[i].remaining = self.entries[i].remaining.combine(added),
            None => self.entries.push(PoolEntry {
                event_id: def.id.clone(),
                remaining: added,
                times_fired: 0,
            }),
        }
        debug!(event = %def.id, "Event unlocked");
        Ok(())
    }

    /// Remove an event for good
    ///
    /// Callers holding data-file ids look them up in the catalog first.
    pub fn ban(&mut self, id: &EventId) {
        if let Some(i) = self.position(id) {
            self.entries.remove(i);
        }
        self.banned.insert(id.clone());
    }
}
