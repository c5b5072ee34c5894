//! Core type definitions used throughout the codebase
//!
//! Identifiers are data-driven strings (they come from scenario and catalog
//! files), so each one is a transparent newtype over `String`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Game turn counter
pub type Turn = u32;

/// Unique identifier for strategic events
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for units
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for countries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub String);

impl CountryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Artifact identifier (dragon orbs, dragonlances, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Side a country or unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Allegiance {
    #[default]
    Neutral,
    Whitestone,
    Highlord,
}

impl Allegiance {
    /// The two playable sides
    pub fn sides() -> [Allegiance; 2] {
        [Allegiance::Highlord, Allegiance::Whitestone]
    }

    /// Opposing side; neutrals have none
    pub fn opponent(&self) -> Option<Allegiance> {
        match self {
            Allegiance::Whitestone => Some(Allegiance::Highlord),
            Allegiance::Highlord => Some(Allegiance::Whitestone),
            Allegiance::Neutral => None,
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Allegiance::Neutral)
    }

    /// True when units of `self` and `other` cannot share a hex
    pub fn is_hostile_to(&self, other: Allegiance) -> bool {
        self.opponent() == Some(other)
    }
}

impl fmt::Display for Allegiance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Allegiance::Neutral => "neutral",
            Allegiance::Whitestone => "whitestone",
            Allegiance::Highlord => "highlord",
        };
        f.pad(name)
    }
}
