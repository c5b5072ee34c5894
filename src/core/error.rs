use thiserror::Error;

use crate::core::types::{ArtifactId, CountryId, EventId, UnitId};
use crate::map::hex::HexCoord;

#[derive(Error, Debug)]
pub enum GloryError {
    /// Catalog miss. Fatal during scenario setup.
    #[error("Unknown event: {0}")]
    UnknownEvent(EventId),

    /// `draw_and_consume` called while no entry is eligible.
    #[error("Event pool has no eligible events")]
    EmptyPool,

    #[error("Cannot deploy {unit} at {hex}: {reason}")]
    IllegalDeployment {
        unit: UnitId,
        hex: HexCoord,
        reason: String,
    },

    #[error("Cannot bring {unit} into play: {reason}")]
    UnitUnavailable { unit: UnitId, reason: String },

    #[error("Invalid scenario rule `{rule}`: {reason}")]
    InvalidScenarioRule { rule: String, reason: String },

    #[error("Unit not found: {0}")]
    UnknownUnit(UnitId),

    #[error("Country not found: {0}")]
    UnknownCountry(CountryId),

    #[error("{0} has already entered the war")]
    NotNeutral(CountryId),

    #[error("No player controls side {0}")]
    UnknownPlayer(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Illegal attack: {0}")]
    IllegalAttack(String),

    #[error("Requirements for {artifact} not met (missing: {missing:?})")]
    RequirementsUnmet {
        artifact: ArtifactId,
        missing: Vec<String>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl GloryError {
    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        GloryError::InvalidScenarioRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Errors a presentation layer can recover from by asking the player again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GloryError::IllegalDeployment { .. } | GloryError::IllegalMove(_) | GloryError::IllegalAttack(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GloryError>;
