//! Unit counters
//!
//! A unit is one counter: an army, a fleet, a dragon wing, a leader or hero.

use serde::{Deserialize, Serialize};

use crate::core::types::{Allegiance, CountryId, UnitId};
use crate::map::hex::HexCoord;
use crate::map::terrain::MovementClass;

/// Counter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Infantry,
    Cavalry,
    General,
    Admiral,
    Hero,
    Wizard,
    Fleet,
    Wing,
    Citadel,
}

impl UnitKind {
    pub fn movement_class(&self) -> MovementClass {
        match self {
            UnitKind::Fleet => MovementClass::Naval,
            UnitKind::Wing | UnitKind::Citadel => MovementClass::Air,
            _ => MovementClass::Land,
        }
    }

    /// Leaders, heroes and wizards stack for free
    pub fn counts_for_stacking(&self) -> bool {
        !matches!(
            self,
            UnitKind::General | UnitKind::Admiral | UnitKind::Hero | UnitKind::Wizard
        )
    }

    /// Counters that are destroyed outright instead of stepping down
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            UnitKind::General | UnitKind::Admiral | UnitKind::Hero | UnitKind::Wizard | UnitKind::Wing
        )
    }

    pub fn is_leader(&self) -> bool {
        matches!(self, UnitKind::General | UnitKind::Admiral)
    }
}

/// Lifecycle of a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Belongs to a country that has not entered the war
    #[default]
    Inactive,
    /// Available to deploy
    Ready,
    Active,
    Depleted,
    /// Off map, may return as a replacement
    Reserve,
    Destroyed,
}

/// A single counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub kind: UnitKind,
    #[serde(default)]
    pub country: Option<CountryId>,
    #[serde(default)]
    pub allegiance: Allegiance,
    pub combat_rating: u32,
    #[serde(default)]
    pub tactical_rating: u32,
    /// Printed movement allowance
    pub movement_allowance: u32,
    /// Points left this turn
    pub movement_points: u32,
    #[serde(default)]
    pub status: UnitStatus,
    #[serde(default)]
    pub position: Option<HexCoord>,
}

impl Unit {
    pub fn new(id: impl Into<UnitId>, kind: UnitKind, combat_rating: u32, movement_allowance: u32) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            kind,
            country: None,
            allegiance: Allegiance::Neutral,
            combat_rating,
            tactical_rating: 0,
            movement_allowance,
            movement_points: movement_allowance,
            status: UnitStatus::Inactive,
            position: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<CountryId>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_allegiance(mut self, allegiance: Allegiance) -> Self {
        self.allegiance = allegiance;
        self
    }

    pub fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tactical_rating(mut self, rating: u32) -> Self {
        self.tactical_rating = rating;
        self
    }

    pub fn movement_class(&self) -> MovementClass {
        self.kind.movement_class()
    }

    /// Movement still available; never more than the printed allowance
    pub fn effective_movement_points(&self) -> u32 {
        self.movement_points.min(self.movement_allowance)
    }

    pub fn spend_movement(&mut self, cost: u32) {
        self.movement_points = self.movement_points.saturating_sub(cost);
    }

    pub fn refresh_movement(&mut self) {
        self.movement_points = self.movement_allowance;
    }

    /// Active or depleted counters are on the board
    pub fn is_on_map(&self) -> bool {
        matches!(self.status, UnitStatus::Active | UnitStatus::Depleted)
    }

    pub fn is_deployable(&self) -> bool {
        matches!(self.status, UnitStatus::Ready | UnitStatus::Reserve)
    }

    /// Step one level down the loss ladder
    ///
    /// Leaders, heroes and wings are destroyed outright. Others step
    /// Active -> Depleted -> Reserve -> Destroyed.
    pub fn apply_combat_loss(&mut self) {
        self.status = match self.status {
            UnitStatus::Active if self.kind.is_permanent() => UnitStatus::Destroyed,
            UnitStatus::Active => UnitStatus::Depleted,
            UnitStatus::Depleted => UnitStatus::Reserve,
            UnitStatus::Reserve => UnitStatus::Destroyed,
            other => other,
        };
    }

    /// Elimination result: permanent counters are destroyed, others go to reserve
    pub fn eliminate(&mut self) {
        self.status = if self.kind.is_permanent() {
            UnitStatus::Destroyed
        } else {
            UnitStatus::Reserve
        };
    }
}
