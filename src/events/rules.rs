//! Scenario event rules
//!
//! The scenario's `active_events`, `possible_events` and `banned_events`
//! keys after parsing. Sentinel values from the data files (`"all"`, an
//! explicit null, a missing key) are distinct variants here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::types::EventId;

/// How much of an event an `active_events` entry removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccurrenceAdjustment {
    Count(u32),
    /// Remove every occurrence and ban the id
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEventsAdjustment {
    pub event_id: EventId,
    pub adjustment: OccurrenceAdjustment,
}

impl ActiveEventsAdjustment {
    pub fn count(event_id: impl Into<EventId>, n: u32) -> Self {
        Self {
            event_id: event_id.into(),
            adjustment: OccurrenceAdjustment::Count(n),
        }
    }

    pub fn all(event_id: impl Into<EventId>) -> Self {
        Self {
            event_id: event_id.into(),
            adjustment: OccurrenceAdjustment::All,
        }
    }
}

/// One listed entry of `possible_events`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossibleEvent {
    pub event_id: EventId,
    /// Overrides the catalog's `max_occurrences` when set
    pub occurrences: Option<i64>,
}

impl PossibleEvent {
    pub fn new(event_id: impl Into<EventId>, occurrences: Option<i64>) -> Self {
        Self {
            event_id: event_id.into(),
            occurrences,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PossibleEventsFilter {
    /// Key absent: the whole catalog is possible
    #[default]
    Unspecified,
    /// Key present and null: nothing is possible
    ExplicitNone,
    Only(Vec<PossibleEvent>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenarioEventRules {
    pub possible: PossibleEventsFilter,
    pub active: Vec<ActiveEventsAdjustment>,
    pub banned: BTreeSet<EventId>,
}

impl ScenarioEventRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_possible(mut self, possible: PossibleEventsFilter) -> Self {
        self.possible = possible;
        self
    }

    pub fn with_active(mut self, adjustment: ActiveEventsAdjustment) -> Self {
        self.active.push(adjustment);
        self
    }

    pub fn with_banned(mut self, id: impl Into<EventId>) -> Self {
        self.banned.insert(id.into());
        self
    }
}
