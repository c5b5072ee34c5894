//! Game state
//!
//! Everything an event or a phase may mutate lives here, owned by a single
//! value. Systems borrow it for the duration of one phase; nothing is held
//! in statics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::core::error::{GloryError, Result};
use crate::core::types::{Allegiance, ArtifactId, CountryId, Turn};
use crate::game::country::Country;
use crate::game::phase::GamePhase;
use crate::game::player::{ArtifactSpec, Player};
use crate::units::model::UnitModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub turn: Turn,
    pub phase: GamePhase,
    /// Side currently acting
    pub active_player: Allegiance,
    /// Side that won this turn's initiative roll
    pub initiative_winner: Allegiance,
    pub second_player_has_acted: bool,

    pub countries: BTreeMap<CountryId, Country>,
    pub players: BTreeMap<Allegiance, Player>,
    pub units: UnitModel,
    pub artifacts: BTreeMap<ArtifactId, ArtifactSpec>,

    /// Combat roll modifiers granted by events, cleared after the side's combat
    pub combat_bonuses: BTreeMap<Allegiance, i32>,
    /// Activation roll modifiers granted by events, cleared after activation
    pub activation_bonuses: BTreeMap<Allegiance, i32>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            turn: 1,
            phase: GamePhase::Replacements,
            active_player: Allegiance::Highlord,
            initiative_winner: Allegiance::Highlord,
            second_player_has_acted: false,
            countries: BTreeMap::new(),
            players: Allegiance::sides()
                .into_iter()
                .map(|side| (side, Player::new(side)))
                .collect(),
            units: UnitModel::new(),
            artifacts: BTreeMap::new(),
            combat_bonuses: BTreeMap::new(),
            activation_bonuses: BTreeMap::new(),
        }
    }

    pub fn add_country(&mut self, country: Country) {
        if !country.is_neutral() {
            if let Some(player) = self.players.get_mut(&country.allegiance) {
                player.controlled_countries.insert(country.id.clone());
            }
        }
        self.countries.insert(country.id.clone(), country);
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.allegiance, player);
    }

    pub fn country(&self, id: &CountryId) -> Result<&Country> {
        self.countries
            .get(id)
            .ok_or_else(|| GloryError::UnknownCountry(id.clone()))
    }

    pub fn country_mut(&mut self, id: &CountryId) -> Result<&mut Country> {
        self.countries
            .get_mut(id)
            .ok_or_else(|| GloryError::UnknownCountry(id.clone()))
    }

    pub fn player(&self, side: Allegiance) -> Result<&Player> {
        self.players
            .get(&side)
            .ok_or_else(|| GloryError::UnknownPlayer(side.to_string()))
    }

    pub fn player_mut(&mut self, side: Allegiance) -> Result<&mut Player> {
        self.players
            .get_mut(&side)
            .ok_or_else(|| GloryError::UnknownPlayer(side.to_string()))
    }

    pub fn current_player(&self) -> Result<&Player> {
        self.player(self.active_player)
    }

    /// Bring a country into the war on `side`: flips its allegiance, readies
    /// its counters and records it under the player's control
    pub fn activate_country(&mut self, id: &CountryId, side: Allegiance) -> Result<usize> {
        let country = self.country_mut(id)?;
        let previous = country.allegiance;
        country.change_allegiance(side);

        if let Some(player) = previous.opponent().and_then(|p| self.players.get_mut(&p)) {
            player.controlled_countries.remove(id);
        }
        if let Some(player) = self.players.get_mut(&side) {
            player.controlled_countries.insert(id.clone());
        }

        let readied = self.units.activate_country_units(id, side);
        info!(country = %id, side = %side, readied, "Country joins the war");
        Ok(readied)
    }

    /// Give `side` an artifact, checking the artifact catalog's requirements
    ///
    /// Artifacts missing from the catalog carry no requirements.
    pub fn grant_artifact(&mut self, side: Allegiance, artifact: &ArtifactId) -> Result<()> {
        let spec = self.artifacts.get(artifact).cloned().unwrap_or_else(|| ArtifactSpec {
            id: artifact.clone(),
            description: String::new(),
            requirements: Vec::new(),
            consumable: false,
        });
        self.player_mut(side)?.grant_artifact(&spec)?;
        info!(artifact = %artifact, side = %side, "Artifact granted");
        Ok(())
    }

    pub fn combat_bonus(&self, side: Allegiance) -> i32 {
        self.combat_bonuses.get(&side).copied().unwrap_or(0)
    }

    pub fn activation_bonus(&self, side: Allegiance) -> i32 {
        self.activation_bonuses.get(&side).copied().unwrap_or(0)
    }

    pub fn add_combat_bonus(&mut self, side: Allegiance, amount: i32) {
        *self.combat_bonuses.entry(side).or_insert(0) += amount;
    }

    pub fn add_activation_bonus(&mut self, side: Allegiance, amount: i32) {
        *self.activation_bonuses.entry(side).or_insert(0) += amount;
    }

    /// Set who won initiative; the winner acts first
    pub fn set_initiative(&mut self, winner: Allegiance) {
        self.initiative_winner = winner;
        self.active_player = winner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitId;
    use crate::game::country::ActivationRatings;
    use crate::units::unit::{Unit, UnitKind, UnitStatus};

    fn state_with_neutral() -> GameState {
        let mut state = GameState::new();
        state.add_country(Country::new("silvanesti", ActivationRatings::new(4, 2)));
        state
            .units
            .add_unit(Unit::new("silv_inf", UnitKind::Infantry, 4, 3).with_country("silvanesti"));
        state
    }

    #[test]
    fn test_new_state_has_both_players() {
        let state = GameState::new();
        assert!(state.player(Allegiance::Whitestone).is_ok());
        assert!(state.player(Allegiance::Highlord).is_ok());
        assert!(state.player(Allegiance::Neutral).is_err());
    }

    #[test]
    fn test_activate_country_readies_units() {
        let mut state = state_with_neutral();
        let id = CountryId::from("silvanesti");
        assert_eq!(state.activate_country(&id, Allegiance::Whitestone).unwrap(), 1);

        assert_eq!(state.country(&id).unwrap().allegiance, Allegiance::Whitestone);
        let unit = state.units.unit(&UnitId::from("silv_inf")).unwrap();
        assert_eq!(unit.status, UnitStatus::Ready);
        assert_eq!(unit.allegiance, Allegiance::Whitestone);
        assert!(state
            .player(Allegiance::Whitestone)
            .unwrap()
            .controlled_countries
            .contains(&id));
    }

    #[test]
    fn test_activate_unknown_country() {
        let mut state = GameState::new();
        let result = state.activate_country(&CountryId::from("atlantis"), Allegiance::Highlord);
        assert!(matches!(result, Err(GloryError::UnknownCountry(_))));
    }

    #[test]
    fn test_bonuses_accumulate_per_side() {
        let mut state = GameState::new();
        state.add_combat_bonus(Allegiance::Whitestone, 1);
        state.add_combat_bonus(Allegiance::Whitestone, 2);
        assert_eq!(state.combat_bonus(Allegiance::Whitestone), 3);
        assert_eq!(state.combat_bonus(Allegiance::Highlord), 0);
    }

    #[test]
    fn test_grant_uncatalogued_artifact() {
        let mut state = GameState::new();
        state
            .grant_artifact(Allegiance::Highlord, &ArtifactId::from("crown_of_power"))
            .unwrap();
        assert!(state
            .player(Allegiance::Highlord)
            .unwrap()
            .has_artifact(&ArtifactId::from("crown_of_power")));
    }
}
