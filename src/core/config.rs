//! Rules configuration with documented constants
//!
//! All magic numbers of the rules engine are collected here with an
//! explanation of what they govern. The value is passed explicitly to the
//! systems that need it; there is no process-wide instance.

use serde::{Deserialize, Serialize};

use crate::core::error::{GloryError, Result};

/// Configuration for the rules engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    // === STACKING ===
    /// Maximum number of army units (infantry, cavalry, fleets, wings,
    /// citadels) that may share one hex
    ///
    /// Leaders, heroes and wizards ride along and never count against it.
    pub max_army_units_per_hex: usize,

    // === DIPLOMACY ===
    /// Sides of the die rolled for country activation
    ///
    /// An activation succeeds when the (bonus-adjusted) roll is less than
    /// or equal to the target rating, so ratings are read on this scale.
    pub activation_die_sides: u32,

    // === COMBAT ===
    /// Sides of the die rolled for land combat
    ///
    /// The roll plus modifiers selects a row of the combat results table;
    /// rows beyond the table's ends read the first or last row.
    pub combat_die_sides: u32,

    // === STRATEGIC EVENTS ===
    /// How quickly an event's draw weight fades once its turn has passed
    ///
    /// weight = probability / (1 + turn_decay_factor * turns_late).
    /// At 0.5 an event drawn two turns late has half its base weight.
    pub turn_decay_factor: f64,

    /// Draw weight used when an event definition carries no probability
    pub default_probability: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_army_units_per_hex: 2,
            activation_die_sides: 10,
            combat_die_sides: 10,
            turn_decay_factor: 0.5,
            default_probability: 1.0,
        }
    }
}

impl RulesConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RulesConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_army_units_per_hex == 0 {
            return Err(GloryError::InvalidConfig(
                "max_army_units_per_hex must be at least 1".into(),
            ));
        }

        if self.activation_die_sides < 2 {
            return Err(GloryError::InvalidConfig(format!(
                "activation_die_sides ({}) must be at least 2",
                self.activation_die_sides
            )));
        }

        if self.combat_die_sides < 2 {
            return Err(GloryError::InvalidConfig(format!(
                "combat_die_sides ({}) must be at least 2",
                self.combat_die_sides
            )));
        }

        if !self.turn_decay_factor.is_finite() || self.turn_decay_factor < 0.0 {
            return Err(GloryError::InvalidConfig(format!(
                "turn_decay_factor ({}) must be a non-negative number",
                self.turn_decay_factor
            )));
        }

        if !self.default_probability.is_finite() || self.default_probability <= 0.0 {
            return Err(GloryError::InvalidConfig(format!(
                "default_probability ({}) must be positive",
                self.default_probability
            )));
        }

        Ok(())
    }
}
