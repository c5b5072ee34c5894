//! Scenario data shapes
//!
//! Scenario and event files are parsed elsewhere; this module takes their
//! deserialized form and builds the runtime types. The event keys allow
//! loose shapes in the data (`"all"` markers, bare ids, explicit nulls), so
//! they are read as raw JSON values and normalized here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::info;

use crate::core::config::RulesConfig;
use crate::core::error::{GloryError, Result};
use crate::core::types::{Allegiance, CountryId, EventId, Turn, UnitId};
use crate::events::catalog::EventCatalog;
use crate::events::definition::EventDefinition;
use crate::events::pool::GameEventPool;
use crate::events::rules::{
    ActiveEventsAdjustment, OccurrenceAdjustment, PossibleEvent, PossibleEventsFilter, ScenarioEventRules,
};
use crate::game::country::Country;
use crate::game::player::{ArtifactSpec, Player};
use crate::game::state::GameState;
use crate::map::board::{Board, LocationKind, Tile};
use crate::map::hex::HexCoord;
use crate::map::terrain::Terrain;
use crate::units::unit::{Unit, UnitKind, UnitStatus};

/// Distinguishes a missing key (`None`) from an explicit null (`Some(None)`)
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn default_start_turn() -> Turn {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSpec {
    pub id: String,
    pub kind: LocationKind,
}

/// A hex that differs from the board's fill terrain, in offset coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexSpec {
    pub col: i32,
    pub row: i32,
    pub terrain: Terrain,
    #[serde(default)]
    pub coastal: Option<bool>,
    #[serde(default)]
    pub location: Option<LocationSpec>,
    #[serde(default)]
    pub country: Option<CountryId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSpec {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub fill: Terrain,
    #[serde(default)]
    pub hexes: Vec<HexSpec>,
}

impl BoardSpec {
    pub fn build(&self) -> Board {
        let mut board = Board::filled(self.width, self.height, self.fill);
        for hex in &self.hexes {
            let mut tile = Tile::new(HexCoord::from_offset(hex.col, hex.row), hex.terrain);
            if let Some(coastal) = hex.coastal {
                tile = tile.with_coastal(coastal);
            }
            if let Some(location) = &hex.location {
                tile = tile.with_location(&location.id, location.kind);
            }
            if let Some(country) = &hex.country {
                tile = tile.with_country(country.clone());
            }
            board.insert(tile);
        }
        board
    }
}

/// Counter as listed in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: UnitId,
    #[serde(default)]
    pub name: Option<String>,
    pub kind: UnitKind,
    #[serde(default)]
    pub country: Option<CountryId>,
    /// Defaults to the country's allegiance
    #[serde(default)]
    pub allegiance: Option<Allegiance>,
    pub combat: u32,
    #[serde(default)]
    pub tactical: u32,
    pub movement: u32,
    #[serde(default)]
    pub status: Option<UnitStatus>,
    /// Starting hex as `[col, row]`
    #[serde(default)]
    pub position: Option<(i32, i32)>,
}

/// A scenario file after deserialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_start_turn")]
    pub start_turn: Turn,
    #[serde(default)]
    pub initiative: Option<Allegiance>,
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactSpec>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub board: Option<BoardSpec>,
    #[serde(default)]
    pub active_events: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub possible_events: Option<Option<Value>>,
    #[serde(default)]
    pub banned_events: Vec<EventId>,
}

/// Everything needed to start play
#[derive(Debug, Clone)]
pub struct Scenario {
    pub id: String,
    pub state: GameState,
    pub board: Board,
    pub rules: ScenarioEventRules,
    pub pool: GameEventPool,
}

impl ScenarioSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize the three event keys
    pub fn event_rules(&self) -> Result<ScenarioEventRules> {
        let possible = match &self.possible_events {
            None => PossibleEventsFilter::Unspecified,
            Some(None) => PossibleEventsFilter::ExplicitNone,
            Some(Some(value)) => PossibleEventsFilter::Only(parse_possible_events(value)?),
        };
        let active = match &self.active_events {
            None => Vec::new(),
            Some(value) => parse_active_events(value)?,
        };
        Ok(ScenarioEventRules {
            possible,
            active,
            banned: self.banned_events.iter().cloned().collect::<BTreeSet<_>>(),
        })
    }

    /// Build the starting state, board and event pool
    ///
    /// Unknown event ids and malformed event rules abort the build, as does
    /// a starting position that breaks deployment rules.
    pub fn build(&self, catalog: &EventCatalog, config: &RulesConfig) -> Result<Scenario> {
        let board = self.board.as_ref().map(BoardSpec::build).unwrap_or_default();

        let mut state = GameState::new();
        state.turn = self.start_turn;
        if let Some(side) = self.initiative {
            state.set_initiative(side);
        }
        for player in &self.players {
            state.add_player(player.clone());
        }
        for country in &self.countries {
            state.add_country(country.clone());
        }
        for artifact in &self.artifacts {
            state.artifacts.insert(artifact.id.clone(), artifact.clone());
        }

        for spec in &self.units {
            let allegiance = match (spec.allegiance, &spec.country) {
                (Some(side), _) => side,
                (None, Some(country)) => state.country(country)?.allegiance,
                (None, None) => Allegiance::Neutral,
            };
            let default_status = if spec.position.is_some() {
                UnitStatus::Ready
            } else {
                UnitStatus::Inactive
            };

            let mut unit = Unit::new(spec.id.clone(), spec.kind, spec.combat, spec.movement)
                .with_allegiance(allegiance)
                .with_status(spec.status.unwrap_or(default_status))
                .with_tactical_rating(spec.tactical);
            if let Some(name) = &spec.name {
                unit.name = name.clone();
            }
            if let Some(country) = &spec.country {
                unit = unit.with_country(country.clone());
            }
            state.units.add_unit(unit);

            if let Some((col, row)) = spec.position {
                state
                    .units
                    .deploy(&spec.id, HexCoord::from_offset(col, row), &board, config)?;
            }
        }

        let rules = self.event_rules()?;
        let pool = GameEventPool::initialize(catalog, &rules)?;
        info!(
            scenario = %self.id,
            units = state.units.len(),
            countries = state.countries.len(),
            events = pool.len(),
            "Scenario loaded"
        );

        Ok(Scenario {
            id: self.id.clone(),
            state,
            board,
            rules,
            pool,
        })
    }
}

/// Parse an event definition list
pub fn load_event_catalog(json: &str) -> Result<EventCatalog> {
    let definitions: Vec<EventDefinition> = serde_json::from_str(json)?;
    EventCatalog::from_definitions(definitions)
}

fn adjustment_value(id: &str, value: &Value) -> Result<OccurrenceAdjustment> {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("all") => Ok(OccurrenceAdjustment::All),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(OccurrenceAdjustment::Count)
            .ok_or_else(|| {
                GloryError::invalid_rule(format!("active_events.{id}"), format!("expected a count, got {n}"))
            }),
        other => Err(GloryError::invalid_rule(
            format!("active_events.{id}"),
            format!("expected a count or \"all\", got {other}"),
        )),
    }
}

/// `active_events` as a list of `{id: n|"all"}` maps or bare ids, or one map
pub fn parse_active_events(value: &Value) -> Result<Vec<ActiveEventsAdjustment>> {
    let mut adjustments = Vec::new();
    let mut push_map = |map: &serde_json::Map<String, Value>| -> Result<()> {
        for (id, v) in map {
            adjustments.push(ActiveEventsAdjustment {
                event_id: EventId::new(id.as_str()),
                adjustment: adjustment_value(id, v)?,
            });
        }
        Ok(())
    };

    match value {
        Value::Null => {}
        Value::Object(map) => push_map(map)?,
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(id) => push_map(&single(id, Value::from(1)))?,
                    Value::Object(map) => push_map(map)?,
                    other => {
                        return Err(GloryError::invalid_rule(
                            "active_events",
                            format!("unexpected entry {other}"),
                        ))
                    }
                }
            }
        }
        other => {
            return Err(GloryError::invalid_rule(
                "active_events",
                format!("expected a list or map, got {other}"),
            ))
        }
    }
    Ok(adjustments)
}

fn single(id: &str, value: Value) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    map.insert(id.to_string(), value);
    map
}

fn occurrence_override(id: &str, value: &Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| {
            GloryError::invalid_rule(format!("possible_events.{id}"), format!("expected an integer, got {n}"))
        }),
        other => Err(GloryError::invalid_rule(
            format!("possible_events.{id}"),
            format!("expected an integer, got {other}"),
        )),
    }
}

/// `possible_events` as a list of ids or `{id: n}` maps, or one map
pub fn parse_possible_events(value: &Value) -> Result<Vec<PossibleEvent>> {
    let mut listed = Vec::new();
    let mut push_map = |map: &serde_json::Map<String, Value>| -> Result<()> {
        for (id, v) in map {
            listed.push(PossibleEvent::new(id.as_str(), occurrence_override(id, v)?));
        }
        Ok(())
    };

    match value {
        Value::Object(map) => push_map(map)?,
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(id) => push_map(&single(id, Value::Null))?,
                    Value::Object(map) => push_map(map)?,
                    other => {
                        return Err(GloryError::invalid_rule(
                            "possible_events",
                            format!("unexpected entry {other}"),
                        ))
                    }
                }
            }
        }
        other => {
            return Err(GloryError::invalid_rule(
                "possible_events",
                format!("expected a list or map, got {other}"),
            ))
        }
    }
    Ok(listed)
}
