//! Countries of Ansalon
//!
//! Every country starts either committed to a side or neutral. Neutral
//! countries join the war through diplomacy (activation rolls), invasion or
//! strategic events.

use serde::{Deserialize, Serialize};

use crate::core::types::{Allegiance, CountryId};
use crate::map::hex::HexCoord;

/// Activation ratings: the roll each side needs to bring the country in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivationRatings {
    pub whitestone: i32,
    pub highlord: i32,
}

impl ActivationRatings {
    pub fn new(whitestone: i32, highlord: i32) -> Self {
        Self { whitestone, highlord }
    }

    pub fn for_side(&self, side: Allegiance) -> i32 {
        match side {
            Allegiance::Whitestone => self.whitestone,
            Allegiance::Highlord => self.highlord,
            Allegiance::Neutral => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    #[serde(default)]
    pub capital: Option<String>,
    /// Counter color, as printed (e.g. `#1f4e9c`)
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub allegiance: Allegiance,
    #[serde(default)]
    pub activation: ActivationRatings,
    /// Total strength points, used by invasion odds
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub territories: Vec<HexCoord>,
}

impl Country {
    pub fn new(id: impl Into<CountryId>, activation: ActivationRatings) -> Self {
        Self {
            id: id.into(),
            capital: None,
            color: String::new(),
            allegiance: Allegiance::Neutral,
            activation,
            strength: 0,
            territories: Vec::new(),
        }
    }

    pub fn with_allegiance(mut self, allegiance: Allegiance) -> Self {
        self.allegiance = allegiance;
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn with_territories(mut self, territories: Vec<HexCoord>) -> Self {
        self.territories = territories;
        self
    }

    pub fn is_neutral(&self) -> bool {
        self.allegiance.is_neutral()
    }

    pub fn change_allegiance(&mut self, allegiance: Allegiance) {
        self.allegiance = allegiance;
    }

    /// Diplomatic pressure: move the activation ratings
    pub fn shift_activation(&mut self, whitestone: i32, highlord: i32) {
        self.activation.whitestone += whitestone;
        self.activation.highlord += highlord;
    }

    pub fn contains_hex(&self, hex: &HexCoord) -> bool {
        self.territories.contains(hex)
    }
}
