//! Strategic event definitions
//!
//! Definitions are loaded once per session and never mutated. The runtime
//! bookkeeping (how many times an event may still fire) lives in the pool.

use serde::{Deserialize, Serialize};

use crate::core::types::{Allegiance, ArtifactId, CountryId, EventId, Turn, UnitId};

/// How often an event may fire, derived from `max_occurrences`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccurrencePolicy {
    /// `max_occurrences` unset or 1
    ExactlyOnce,
    /// `max_occurrences == 0`; never enters the pool
    Never,
    /// `max_occurrences > 1`
    Bounded(u32),
    /// `max_occurrences < 0`
    Unbounded,
}

impl OccurrencePolicy {
    pub fn from_max_occurrences(max: Option<i64>) -> Self {
        match max {
            None | Some(1) => OccurrencePolicy::ExactlyOnce,
            Some(0) => OccurrencePolicy::Never,
            Some(n) if n < 0 => OccurrencePolicy::Unbounded,
            Some(n) => OccurrencePolicy::Bounded(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }

    /// Number of times the event may fire, `None` when unlimited
    pub fn initial_count(&self) -> Option<u32> {
        match self {
            OccurrencePolicy::ExactlyOnce => Some(1),
            OccurrencePolicy::Never => Some(0),
            OccurrencePolicy::Bounded(n) => Some(*n),
            OccurrencePolicy::Unbounded => None,
        }
    }
}

/// Condition that fires an event without a random draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Always,
    OnTurn(Turn),
}

impl Trigger {
    pub fn is_met(&self, turn: Turn) -> bool {
        match self {
            Trigger::Always => true,
            Trigger::OnTurn(t) => *t == turn,
        }
    }
}

/// Entry of an `unlock_events` effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSpec {
    pub id: EventId,
    /// Occurrences to add; unset uses the catalog's `max_occurrences`
    #[serde(default)]
    pub occurrences: Option<i64>,
}

/// What happens when an event fires
///
/// Effects act on behalf of the side that drew the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEffect {
    /// A neutral country joins the drawing side
    Alliance { country: CountryId },
    /// Reserve or inactive units become ready for the drawing side
    AddUnits { units: Vec<UnitId> },
    GrantArtifact { artifact: ArtifactId },
    GrantPrerequisite { prerequisite: String },
    CombatBonus { amount: i32 },
    ActivationBonus { amount: i32 },
    /// Make further events possible
    UnlockEvents { events: Vec<UnlockSpec> },
    /// Remove events from the pool for the rest of the game
    BanEvents { events: Vec<EventId> },
    AlignmentShift {
        country: CountryId,
        #[serde(default)]
        whitestone: i32,
        #[serde(default)]
        highlord: i32,
    },
}

/// Short human readable summary of an effect
pub fn describe_effect(effect: &EventEffect) -> String {
    match effect {
        EventEffect::Alliance { country } => format!("{country} joins the war"),
        EventEffect::AddUnits { units } => format!("{} unit(s) arrive", units.len()),
        EventEffect::GrantArtifact { artifact } => format!("gain {artifact}"),
        EventEffect::GrantPrerequisite { prerequisite } => format!("{prerequisite} fulfilled"),
        EventEffect::CombatBonus { amount } => format!("combat {amount:+}"),
        EventEffect::ActivationBonus { amount } => format!("activation {amount:+}"),
        EventEffect::UnlockEvents { events } => format!("{} event(s) become possible", events.len()),
        EventEffect::BanEvents { events } => format!("{} event(s) banned", events.len()),
        EventEffect::AlignmentShift {
            country,
            whitestone,
            highlord,
        } => format!("{country} alignment {whitestone:+}/{highlord:+}"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    #[serde(alias = "event_id")]
    pub id: EventId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub max_occurrences: Option<i64>,
    /// Relative draw weight for the weighted selector
    #[serde(default)]
    pub probability: Option<f64>,
    /// Only this side may draw the event; unset means either
    #[serde(default)]
    pub allegiance: Option<Allegiance>,
    /// Earliest turn the event can be drawn
    #[serde(default)]
    pub turn: Option<Turn>,
    /// Artifacts or prerequisites the drawing player must hold
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub effects: Vec<EventEffect>,
}

impl EventDefinition {
    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            max_occurrences: None,
            probability: None,
            allegiance: None,
            turn: None,
            requirements: Vec::new(),
            triggers: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_max_occurrences(mut self, max: i64) -> Self {
        self.max_occurrences = Some(max);
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn with_allegiance(mut self, side: Allegiance) -> Self {
        self.allegiance = Some(side);
        self
    }

    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.turn = Some(turn);
        self
    }

    pub fn with_requirement(mut self, requirement: &str) -> Self {
        self.requirements.push(requirement.to_string());
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_effect(mut self, effect: EventEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn policy(&self) -> OccurrencePolicy {
        OccurrencePolicy::from_max_occurrences(self.max_occurrences)
    }

    pub fn is_auto_triggered(&self) -> bool {
        !self.triggers.is_empty()
    }

    pub fn trigger_met(&self, turn: Turn) -> bool {
        self.triggers.iter().any(|t| t.is_met(turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_max_occurrences() {
        assert_eq!(OccurrencePolicy::from_max_occurrences(None), OccurrencePolicy::ExactlyOnce);
        assert_eq!(OccurrencePolicy::from_max_occurrences(Some(1)), OccurrencePolicy::ExactlyOnce);
        assert_eq!(OccurrencePolicy::from_max_occurrences(Some(0)), OccurrencePolicy::Never);
        assert_eq!(OccurrencePolicy::from_max_occurrences(Some(3)), OccurrencePolicy::Bounded(3));
        assert_eq!(OccurrencePolicy::from_max_occurrences(Some(-1)), OccurrencePolicy::Unbounded);
    }

    #[test]
    fn test_definition_from_json() {
        let json = r#"{
            "event_id": "kingpriest_returns",
            "max_occurrences": -1,
            "allegiance": "whitestone",
            "requirements": ["dragon_orb"],
            "triggers": [{ "on_turn": 4 }],
            "effects": [
                { "type": "combat_bonus", "amount": 2 },
                { "type": "alignment_shift", "country": "kalaman", "whitestone": 1 }
            ]
        }"#;
        let def: EventDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.id, EventId::from("kingpriest_returns"));
        assert_eq!(def.policy(), OccurrencePolicy::Unbounded);
        assert_eq!(def.allegiance, Some(Allegiance::Whitestone));
        assert!(def.trigger_met(4));
        assert!(!def.trigger_met(5));
        assert_eq!(
            def.effects[1],
            EventEffect::AlignmentShift {
                country: CountryId::from("kalaman"),
                whitestone: 1,
                highlord: 0,
            }
        );
    }

    #[test]
    fn test_describe_effect() {
        assert_eq!(describe_effect(&EventEffect::CombatBonus { amount: 2 }), "combat +2");
        assert_eq!(
            describe_effect(&EventEffect::Alliance {
                country: CountryId::from("ergoth")
            }),
            "ergoth joins the war"
        );
    }
}
