//! Land combat
//!
//! Attacking and defending strengths select an odds column of the combat
//! results table, a die roll plus modifiers selects the row. Each side's
//! part of the result is applied through the unit model's loss ladder.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::core::config::RulesConfig;
use crate::core::error::{GloryError, Result};
use crate::core::types::{Allegiance, UnitId};
use crate::game::state::GameState;
use crate::map::board::{Board, LocationKind};
use crate::map::hex::HexCoord;
use crate::map::terrain::Terrain;
use crate::units::model::UnitModel;
use crate::units::unit::{Unit, UnitKind, UnitStatus};

/// Odds column, attacker first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Odds {
    #[serde(rename = "1:3")]
    OneToThree,
    #[serde(rename = "1:2")]
    OneToTwo,
    #[serde(rename = "2:3")]
    TwoToThree,
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "3:2")]
    ThreeToTwo,
    #[serde(rename = "2:1")]
    TwoToOne,
    #[serde(rename = "3:1")]
    ThreeToOne,
    #[serde(rename = "4:1")]
    FourToOne,
    #[serde(rename = "5:1")]
    FiveToOne,
    #[serde(rename = "6:1")]
    SixToOne,
}

impl Odds {
    pub const ALL: [Odds; 10] = [
        Odds::OneToThree,
        Odds::OneToTwo,
        Odds::TwoToThree,
        Odds::OneToOne,
        Odds::ThreeToTwo,
        Odds::TwoToOne,
        Odds::ThreeToOne,
        Odds::FourToOne,
        Odds::FiveToOne,
        Odds::SixToOne,
    ];

    /// (attacker, defender) parts of the ratio
    pub fn ratio(&self) -> (u64, u64) {
        match self {
            Odds::OneToThree => (1, 3),
            Odds::OneToTwo => (1, 2),
            Odds::TwoToThree => (2, 3),
            Odds::OneToOne => (1, 1),
            Odds::ThreeToTwo => (3, 2),
            Odds::TwoToOne => (2, 1),
            Odds::ThreeToOne => (3, 1),
            Odds::FourToOne => (4, 1),
            Odds::FiveToOne => (5, 1),
            Odds::SixToOne => (6, 1),
        }
    }

    /// Best column the strengths reach, rounding in the defender's favour
    ///
    /// Anything below 1:2 fights at 1:3; an undefended hex is attacked at 6:1.
    pub fn from_strengths(attack: u32, defense: u32) -> Self {
        if defense == 0 {
            return Odds::SixToOne;
        }
        let (attack, defense) = (u64::from(attack), u64::from(defense));
        Odds::ALL
            .iter()
            .rev()
            .copied()
            .find(|odds| {
                let (a, d) = odds.ratio();
                attack * d >= defense * a
            })
            .unwrap_or(Odds::OneToThree)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Odds::OneToThree => "1:3",
            Odds::OneToTwo => "1:2",
            Odds::TwoToThree => "2:3",
            Odds::OneToOne => "1:1",
            Odds::ThreeToTwo => "3:2",
            Odds::TwoToOne => "2:1",
            Odds::ThreeToOne => "3:1",
            Odds::FourToOne => "4:1",
            Odds::FiveToOne => "5:1",
            Odds::SixToOne => "6:1",
        }
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One side's half of a table entry
///
/// Written as `-` (no effect) or a combination of `E` (eliminate all),
/// `D` (deplete all), step digits and `R` (retreat), e.g. `2DR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideResult {
    pub eliminate: bool,
    pub deplete: bool,
    /// Single-unit losses, weakest unit first
    pub steps: u32,
    pub retreat: bool,
}

impl SideResult {
    pub fn is_no_effect(&self) -> bool {
        *self == Self::default()
    }
}

impl FromStr for SideResult {
    type Err = String;

    fn from_str(code: &str) -> std::result::Result<Self, Self::Err> {
        let code = code.trim();
        if code == "-" {
            return Ok(Self::default());
        }
        let mut result = Self::default();
        for ch in code.chars() {
            match ch {
                'E' => result.eliminate = true,
                'D' => result.deplete = true,
                'R' => result.retreat = true,
                digit if digit.is_ascii_digit() => {
                    result.steps += digit.to_digit(10).unwrap_or(0);
                }
                other => return Err(format!("unexpected `{}` in `{}`", other, code)),
            }
        }
        if result.is_no_effect() {
            return Err(format!("`{}` has no effect; write `-`", code));
        }
        Ok(result)
    }
}

impl fmt::Display for SideResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_effect() {
            return write!(f, "-");
        }
        if self.steps > 0 {
            write!(f, "{}", self.steps)?;
        }
        if self.eliminate {
            write!(f, "E")?;
        }
        if self.deplete {
            write!(f, "D")?;
        }
        if self.retreat {
            write!(f, "R")?;
        }
        Ok(())
    }
}

/// A table entry: attacker result / defender result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatResult {
    pub attacker: SideResult,
    pub defender: SideResult,
}

impl FromStr for CombatResult {
    type Err = String;

    fn from_str(code: &str) -> std::result::Result<Self, Self::Err> {
        let Some((attacker, defender)) = code.split_once('/') else {
            return Err(format!("`{}` is not attacker/defender", code));
        };
        Ok(Self {
            attacker: attacker.parse()?,
            defender: defender.parse()?,
        })
    }
}

impl fmt::Display for CombatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.attacker, self.defender)
    }
}

#[derive(Deserialize)]
struct TableData {
    columns: Vec<Odds>,
    rows: BTreeMap<i32, Vec<String>>,
}

/// Combat results table, indexed by modified roll and odds column
#[derive(Debug, Clone, PartialEq)]
pub struct CombatTable {
    min_roll: i32,
    max_roll: i32,
    entries: BTreeMap<(i32, Odds), CombatResult>,
}

impl CombatTable {
    /// Parse a table from JSON: `{"columns": ["1:3", ...], "rows": {"-5": ["E/-", ...]}}`
    ///
    /// Every odds column must be listed once and the rows must cover a
    /// contiguous range of modified rolls.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: TableData = serde_json::from_str(json)?;

        let listed: BTreeSet<Odds> = data.columns.iter().copied().collect();
        if listed.len() != data.columns.len() || listed.len() != Odds::ALL.len() {
            return Err(GloryError::invalid_rule(
                "crt.columns",
                "every odds column must be listed exactly once",
            ));
        }

        let (Some(&min_roll), Some(&max_roll)) = (data.rows.keys().next(), data.rows.keys().next_back()) else {
            return Err(GloryError::invalid_rule("crt.rows", "table has no rows"));
        };
        let expected = usize::try_from(i64::from(max_roll) - i64::from(min_roll) + 1).unwrap_or(usize::MAX);
        if data.rows.len() != expected {
            return Err(GloryError::invalid_rule(
                "crt.rows",
                format!("rows {min_roll}..={max_roll} are not contiguous"),
            ));
        }

        let mut entries = BTreeMap::new();
        for (roll, cells) in &data.rows {
            if cells.len() != data.columns.len() {
                return Err(GloryError::invalid_rule(
                    format!("crt.rows.{roll}"),
                    format!("expected {} entries, found {}", data.columns.len(), cells.len()),
                ));
            }
            for (odds, cell) in data.columns.iter().zip(cells) {
                let result = cell
                    .parse::<CombatResult>()
                    .map_err(|reason| GloryError::invalid_rule(format!("crt.rows.{roll}.{odds}"), reason))?;
                entries.insert((*roll, *odds), result);
            }
        }

        Ok(Self {
            min_roll,
            max_roll,
            entries,
        })
    }

    /// Lowest and highest modified roll in the table
    pub fn roll_range(&self) -> (i32, i32) {
        (self.min_roll, self.max_roll)
    }

    /// Entry for a modified roll, clamped into the table
    pub fn lookup(&self, roll: i32, odds: Odds) -> CombatResult {
        let roll = roll.clamp(self.min_roll, self.max_roll);
        self.entries.get(&(roll, odds)).copied().unwrap_or_default()
    }
}

/// Die roll modifiers, positive in the attacker's favour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatModifiers {
    /// Best attacking leader's tactical rating less the best defending one's
    pub leaders: i32,
    /// Dragon wing ratings, attacker's less defender's
    pub wings: i32,
    pub cavalry: i32,
    pub flight: i32,
    /// Defending location (fortress, city, port, undercity)
    pub location: i32,
    /// Strategic event bonus of the attacking side
    pub event_bonus: i32,
}

impl CombatModifiers {
    pub fn total(&self) -> i32 {
        self.leaders + self.wings + self.cavalry + self.flight + self.location + self.event_bonus
    }
}

/// Everything known about a battle before the die is rolled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatPlan {
    pub side: Allegiance,
    pub target: HexCoord,
    pub attackers: Vec<UnitId>,
    pub defenders: Vec<UnitId>,
    pub attack_strength: u32,
    /// Defending strength after the location multiplier
    pub defense_strength: u32,
    pub odds: Odds,
    pub modifiers: CombatModifiers,
    /// Defenders in a location hold their ground on retreat results
    pub defender_ignores_retreat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatReport {
    pub plan: CombatPlan,
    pub roll: u32,
    pub modified_roll: i32,
    pub result: CombatResult,
    /// Counters whose status changed, with their new status
    pub losses: Vec<(UnitId, UnitStatus)>,
    pub retreats: Vec<(UnitId, HexCoord)>,
}

fn signed(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Counters that suffer land combat results
fn takes_losses(unit: &Unit) -> bool {
    matches!(
        unit.kind,
        UnitKind::Infantry | UnitKind::Cavalry | UnitKind::Wing | UnitKind::Citadel
    )
}

fn is_flier(unit: &Unit) -> bool {
    matches!(unit.kind, UnitKind::Wing | UnitKind::Citadel)
}

/// Leaders fight through their tactical rating, not their strength
fn land_strength(units: &[&Unit]) -> u32 {
    units
        .iter()
        .filter(|u| !u.kind.is_leader())
        .map(|u| u.combat_rating)
        .sum()
}

/// Defending strength multiplier of the location on `hex`
pub fn defense_multiplier(board: &Board, hex: &HexCoord) -> u32 {
    match board.tile(hex).and_then(|t| t.location.as_ref()).map(|l| l.kind) {
        Some(LocationKind::Fortress) => 3,
        Some(LocationKind::City | LocationKind::Port | LocationKind::Capital) => 2,
        _ => 1,
    }
}

/// Die roll modifiers for `attackers` against `defenders` on `target`
pub fn combat_modifiers(
    state: &GameState,
    board: &Board,
    side: Allegiance,
    attackers: &[&Unit],
    defenders: &[&Unit],
    target: &HexCoord,
) -> CombatModifiers {
    let tile = board.tile(target);
    let terrain = tile.map(|t| t.terrain).unwrap_or_default();
    let location = tile.and_then(|t| t.location.as_ref()).map(|l| l.kind);

    let best_leader = |units: &[&Unit]| {
        units
            .iter()
            .filter(|u| u.kind.is_leader())
            .map(|u| signed(u.tactical_rating))
            .max()
            .unwrap_or(0)
    };
    let wing_rating = |units: &[&Unit]| {
        units
            .iter()
            .filter(|u| u.kind == UnitKind::Wing)
            .map(|u| signed(u.combat_rating))
            .sum::<i32>()
    };

    let cavalry_blocked = location.is_some() || matches!(terrain, Terrain::Forest | Terrain::Jungle);
    let cavalry = if !cavalry_blocked && attackers.iter().any(|u| u.kind == UnitKind::Cavalry) {
        1
    } else {
        0
    };

    let flight_blocked = location == Some(LocationKind::Undercity)
        || matches!(terrain, Terrain::Forest | Terrain::Mountain | Terrain::Jungle);
    let mut flight = 0;
    if !flight_blocked {
        if attackers.iter().any(|u| is_flier(u)) {
            flight += 1;
        }
        if defenders.iter().any(|u| is_flier(u)) {
            flight -= 1;
        }
    }

    let location = match location {
        Some(LocationKind::Fortress) => -4,
        Some(LocationKind::City | LocationKind::Port | LocationKind::Capital) => -2,
        Some(LocationKind::Undercity) => -10,
        None => 0,
    };

    let event_bonus = if state.active_player == side {
        state.combat_bonus(side)
    } else {
        0
    };

    CombatModifiers {
        leaders: best_leader(attackers) - best_leader(defenders),
        wings: wing_rating(attackers) - wing_rating(defenders),
        cavalry,
        flight,
        location,
        event_bonus,
    }
}

/// Check an attack on `target` and work out its odds and modifiers
///
/// Attackers must all be on the board, adjacent to `target`, and belong to
/// the active player. The target must hold enemy units.
pub fn plan_combat(state: &GameState, board: &Board, attackers: &[UnitId], target: HexCoord) -> Result<CombatPlan> {
    if attackers.is_empty() {
        return Err(GloryError::IllegalAttack("no attacking units".into()));
    }
    let side = state.active_player;
    if side.is_neutral() {
        return Err(GloryError::UnknownPlayer(side.to_string()));
    }

    let mut seen = BTreeSet::new();
    let mut attacking = Vec::with_capacity(attackers.len());
    for id in attackers {
        if !seen.insert(id) {
            return Err(GloryError::IllegalAttack(format!("{} selected more than once", id)));
        }
        let unit = state
            .units
            .unit(id)
            .ok_or_else(|| GloryError::UnknownUnit(id.clone()))?;
        if unit.allegiance != side {
            return Err(GloryError::IllegalAttack(format!("{} does not fight for {}", id, side)));
        }
        match unit.position {
            Some(hex) if unit.is_on_map() && hex.distance(&target) == 1 => {}
            _ => {
                return Err(GloryError::IllegalAttack(format!(
                    "{} is not adjacent to {}",
                    id, target
                )))
            }
        }
        attacking.push(unit);
    }

    let defending: Vec<&Unit> = state
        .units
        .units_at(&target)
        .into_iter()
        .filter(|u| u.allegiance.is_hostile_to(side))
        .collect();
    if defending.is_empty() {
        return Err(GloryError::IllegalAttack(format!("no enemy units at {}", target)));
    }

    let attack_strength = land_strength(&attacking);
    let defense_strength = land_strength(&defending).saturating_mul(defense_multiplier(board, &target));
    let modifiers = combat_modifiers(state, board, side, &attacking, &defending, &target);
    let defender_ignores_retreat = board.tile(&target).is_some_and(|t| t.location.is_some());

    Ok(CombatPlan {
        side,
        target,
        attackers: attacking.iter().map(|u| u.id.clone()).collect(),
        defenders: defending.iter().map(|u| u.id.clone()).collect(),
        attack_strength,
        defense_strength,
        odds: Odds::from_strengths(attack_strength, defense_strength),
        modifiers,
        defender_ignores_retreat,
    })
}

/// Pick the next counter to take a single step loss
///
/// Full-strength ground units go first, then depleted ground units, then
/// wings; the weakest of each group is hit.
fn next_step_loss(model: &UnitModel, ids: &[UnitId]) -> Option<UnitId> {
    let on_map: Vec<&Unit> = ids
        .iter()
        .filter_map(|id| model.unit(id))
        .filter(|u| u.is_on_map())
        .collect();
    let groups = [
        (false, UnitStatus::Active),
        (false, UnitStatus::Depleted),
        (true, UnitStatus::Active),
        (true, UnitStatus::Depleted),
    ];
    groups.iter().find_map(|&(wing, status)| {
        on_map
            .iter()
            .filter(|u| (u.kind == UnitKind::Wing) == wing && u.status == status)
            .min_by_key(|u| u.combat_rating)
            .map(|u| u.id.clone())
    })
}

/// Apply one side's result to its units
///
/// Depleted counters hit again are eliminated. Retreating counters with no
/// legal hex to fall back to are eliminated.
fn apply_side<R: Rng + ?Sized>(
    model: &mut UnitModel,
    board: &Board,
    config: &RulesConfig,
    ids: &[UnitId],
    result: SideResult,
    may_retreat: bool,
    rng: &mut R,
    retreats: &mut Vec<(UnitId, HexCoord)>,
) -> Result<()> {
    let affected: Vec<UnitId> = ids
        .iter()
        .filter(|id| model.unit(id).is_some_and(|u| u.is_on_map() && takes_losses(u)))
        .cloned()
        .collect();

    if result.eliminate {
        for id in &affected {
            model.eliminate_unit(id)?;
        }
    } else if result.deplete {
        for id in &affected {
            match model.unit(id).map(|u| u.status) {
                Some(UnitStatus::Depleted) => {
                    model.eliminate_unit(id)?;
                }
                Some(UnitStatus::Active) => {
                    model.apply_combat_loss(id)?;
                }
                _ => {}
            }
        }
    }

    for _ in 0..result.steps {
        let Some(id) = next_step_loss(model, &affected) else {
            break;
        };
        match model.unit(&id).map(|u| u.status) {
            Some(UnitStatus::Depleted) => {
                model.eliminate_unit(&id)?;
            }
            _ => {
                model.apply_combat_loss(&id)?;
            }
        }
    }

    if result.retreat && may_retreat {
        for id in &affected {
            let Some(from) = model.unit(id).filter(|u| u.is_on_map()).and_then(|u| u.position) else {
                continue;
            };
            let options: Vec<HexCoord> = board
                .neighbors(&from)
                .into_iter()
                .filter(|hex| model.can_retreat_to(id, hex, board, config))
                .collect();
            match options.choose(rng) {
                Some(&hex) => {
                    model.retreat_unit(id, hex, board, config)?;
                    retreats.push((id.clone(), hex));
                }
                None => {
                    debug!(unit = %id, "No retreat path; unit eliminated");
                    model.eliminate_unit(id)?;
                }
            }
        }
    }
    Ok(())
}

/// Apply a table result to both sides of a planned battle
///
/// Results are worked out on a copy of the units and committed together.
pub fn apply_combat_result<R: Rng + ?Sized>(
    state: &mut GameState,
    board: &Board,
    plan: &CombatPlan,
    result: CombatResult,
    config: &RulesConfig,
    rng: &mut R,
) -> Result<(Vec<(UnitId, UnitStatus)>, Vec<(UnitId, HexCoord)>)> {
    let mut units = state.units.clone();
    let mut retreats = Vec::new();

    apply_side(&mut units, board, config, &plan.attackers, result.attacker, true, rng, &mut retreats)?;
    apply_side(
        &mut units,
        board,
        config,
        &plan.defenders,
        result.defender,
        !plan.defender_ignores_retreat,
        rng,
        &mut retreats,
    )?;

    let losses = plan
        .attackers
        .iter()
        .chain(&plan.defenders)
        .filter_map(|id| {
            let before = state.units.unit(id)?.status;
            let after = units.unit(id)?.status;
            (before != after).then(|| (id.clone(), after))
        })
        .collect();

    state.units = units;
    Ok((losses, retreats))
}

/// Fight a land battle: plan, roll, look up the table and apply the result
pub fn resolve_combat<R: Rng + ?Sized>(
    state: &mut GameState,
    board: &Board,
    table: &CombatTable,
    attackers: &[UnitId],
    target: HexCoord,
    config: &RulesConfig,
    rng: &mut R,
) -> Result<CombatReport> {
    let plan = plan_combat(state, board, attackers, target)?;
    let roll = rng.gen_range(1..=config.combat_die_sides.max(1));
    let (min_roll, max_roll) = table.roll_range();
    let modified_roll = signed(roll)
        .saturating_add(plan.modifiers.total())
        .clamp(min_roll, max_roll);
    let result = table.lookup(modified_roll, plan.odds);

    let (losses, retreats) = apply_combat_result(state, board, &plan, result, config, rng)?;

    info!(
        side = %plan.side,
        target = %target,
        odds = %plan.odds,
        roll,
        modified = modified_roll,
        result = %result,
        losses = losses.len(),
        "Combat resolved"
    );

    Ok(CombatReport {
        plan,
        roll,
        modified_roll,
        result,
        losses,
        retreats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::board::Tile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table() -> CombatTable {
        CombatTable::from_json(include_str!("../../data/crt.json")).unwrap()
    }

    fn board() -> Board {
        Board::filled(8, 8, Terrain::Grassland)
    }

    /// Whitestone attacks from (2,3) into the Highlord hex next to it
    fn battle(attackers: Vec<Unit>, defenders: Vec<Unit>, board: &Board) -> (GameState, HexCoord) {
        let from = HexCoord::from_offset(2, 3);
        let target = from.neighbors()[0];
        let config = RulesConfig::default();
        let mut state = GameState::new();
        state.active_player = Allegiance::Whitestone;
        for (units, side, hex) in [
            (attackers, Allegiance::Whitestone, from),
            (defenders, Allegiance::Highlord, target),
        ] {
            for unit in units {
                let id = unit.id.clone();
                state
                    .units
                    .add_unit(unit.with_allegiance(side).with_status(UnitStatus::Ready));
                state.units.deploy(&id, hex, board, &config).unwrap();
            }
        }
        (state, target)
    }

    fn ids(names: &[&str]) -> Vec<UnitId> {
        names.iter().map(|n| UnitId::from(*n)).collect()
    }

    #[test]
    fn test_odds_round_in_defenders_favour() {
        assert_eq!(Odds::from_strengths(12, 2), Odds::SixToOne);
        assert_eq!(Odds::from_strengths(11, 2), Odds::FiveToOne);
        assert_eq!(Odds::from_strengths(3, 2), Odds::ThreeToTwo);
        assert_eq!(Odds::from_strengths(5, 4), Odds::OneToOne);
        assert_eq!(Odds::from_strengths(2, 3), Odds::TwoToThree);
        assert_eq!(Odds::from_strengths(1, 5), Odds::OneToThree);
        assert_eq!(Odds::from_strengths(4, 0), Odds::SixToOne);
    }

    #[test]
    fn test_result_codes() {
        let result: CombatResult = "-/2DR".parse().unwrap();
        assert!(result.attacker.is_no_effect());
        assert_eq!(
            result.defender,
            SideResult {
                eliminate: false,
                deplete: true,
                steps: 2,
                retreat: true
            }
        );
        assert_eq!(result.to_string(), "-/2DR");
        assert!("E".parse::<CombatResult>().is_err());
        assert!("X/-".parse::<CombatResult>().is_err());
    }

    #[test]
    fn test_table_clamps_rolls() {
        let table = table();
        assert_eq!(table.roll_range(), (-5, 16));
        assert_eq!(table.lookup(-40, Odds::OneToThree), table.lookup(-5, Odds::OneToThree));
        assert_eq!(table.lookup(99, Odds::SixToOne), table.lookup(16, Odds::SixToOne));
    }

    #[test]
    fn test_table_rejects_gaps_and_bad_cells() {
        let gap = r#"{ "columns": ["1:3","1:2","2:3","1:1","3:2","2:1","3:1","4:1","5:1","6:1"],
            "rows": { "1": ["-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1"],
                      "3": ["-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1"] } }"#;
        assert!(matches!(
            CombatTable::from_json(gap),
            Err(GloryError::InvalidScenarioRule { .. })
        ));

        let bad = r#"{ "columns": ["1:3","1:2","2:3","1:1","3:2","2:1","3:1","4:1","5:1","6:1"],
            "rows": { "1": ["-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1","-/1","Q/1"] } }"#;
        match CombatTable::from_json(bad) {
            Err(GloryError::InvalidScenarioRule { rule, .. }) => assert_eq!(rule, "crt.rows.1.6:1"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_plan_counts_location_and_event_bonus() {
        let mut board = board();
        let target = HexCoord::from_offset(2, 3).neighbors()[0];
        board.insert(Tile::new(target, Terrain::Grassland).with_location("vingaard", LocationKind::Fortress));
        let (mut state, target) = battle(
            vec![
                Unit::new("knights", UnitKind::Cavalry, 6, 4),
                Unit::new("gunthar", UnitKind::General, 0, 4).with_tactical_rating(3),
            ],
            vec![Unit::new("draconians", UnitKind::Infantry, 2, 3)],
            &board,
        );
        state.add_combat_bonus(Allegiance::Whitestone, 2);

        let plan = plan_combat(&state, &board, &ids(&["knights", "gunthar"]), target).unwrap();
        assert_eq!(plan.attack_strength, 6);
        assert_eq!(plan.defense_strength, 6);
        assert_eq!(plan.odds, Odds::OneToOne);
        // Cavalry gets nothing against a location
        assert_eq!(
            plan.modifiers,
            CombatModifiers {
                leaders: 3,
                wings: 0,
                cavalry: 0,
                flight: 0,
                location: -4,
                event_bonus: 2,
            }
        );
        assert!(plan.defender_ignores_retreat);
    }

    #[test]
    fn test_plan_open_ground_cavalry_and_flight() {
        let board = board();
        let (state, target) = battle(
            vec![
                Unit::new("knights", UnitKind::Cavalry, 4, 4),
                Unit::new("silver", UnitKind::Wing, 5, 6),
            ],
            vec![Unit::new("red", UnitKind::Wing, 3, 6)],
            &board,
        );
        let plan = plan_combat(&state, &board, &ids(&["knights", "silver"]), target).unwrap();
        assert_eq!(plan.odds, Odds::ThreeToOne);
        assert_eq!(plan.modifiers.cavalry, 1);
        assert_eq!(plan.modifiers.flight, 0);
        assert_eq!(plan.modifiers.wings, 2);
        assert!(!plan.defender_ignores_retreat);
    }

    #[test]
    fn test_event_bonus_only_for_active_player() {
        let board = board();
        let (mut state, target) = battle(
            vec![Unit::new("knights", UnitKind::Cavalry, 4, 4)],
            vec![Unit::new("ogres", UnitKind::Infantry, 4, 3)],
            &board,
        );
        state.add_combat_bonus(Allegiance::Whitestone, 3);
        state.add_combat_bonus(Allegiance::Highlord, 5);
        let plan = plan_combat(&state, &board, &ids(&["knights"]), target).unwrap();
        assert_eq!(plan.modifiers.event_bonus, 3);
    }

    #[test]
    fn test_illegal_attacks() {
        let board = board();
        let (mut state, target) = battle(
            vec![Unit::new("knights", UnitKind::Cavalry, 4, 4)],
            vec![Unit::new("ogres", UnitKind::Infantry, 4, 3)],
            &board,
        );
        let far = HexCoord::from_offset(7, 7);
        let err = plan_combat(&state, &board, &ids(&["knights"]), far).unwrap_err();
        assert!(matches!(err, GloryError::IllegalAttack(_)));
        assert!(err.is_recoverable());

        assert!(plan_combat(&state, &board, &ids(&["knights", "knights"]), target).is_err());
        assert!(plan_combat(&state, &board, &[], target).is_err());

        state.active_player = Allegiance::Highlord;
        assert!(matches!(
            plan_combat(&state, &board, &ids(&["knights"]), target),
            Err(GloryError::IllegalAttack(_))
        ));
    }

    #[test]
    fn test_step_losses_hit_weakest_ground_unit_first() {
        let board = board();
        let (mut state, target) = battle(
            vec![Unit::new("knights", UnitKind::Cavalry, 6, 4)],
            vec![
                Unit::new("ogres", UnitKind::Infantry, 5, 3),
                Unit::new("goblins", UnitKind::Infantry, 2, 3),
            ],
            &board,
        );
        let plan = plan_combat(&state, &board, &ids(&["knights"]), target).unwrap();
        let result: CombatResult = "-/2".parse().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let (losses, retreats) = apply_combat_result(&mut state, &board, &plan, result, &RulesConfig::default(), &mut rng)
            .unwrap();
        assert!(retreats.is_empty());
        assert_eq!(
            losses,
            vec![
                (UnitId::from("ogres"), UnitStatus::Depleted),
                (UnitId::from("goblins"), UnitStatus::Depleted),
            ]
        );
        assert!(state.units.is_consistent());
    }

    #[test]
    fn test_eliminate_and_retreat_results() {
        let board = board();
        let (mut state, target) = battle(
            vec![Unit::new("knights", UnitKind::Cavalry, 6, 4)],
            vec![Unit::new("ogres", UnitKind::Infantry, 5, 3)],
            &board,
        );
        let plan = plan_combat(&state, &board, &ids(&["knights"]), target).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let result: CombatResult = "1/DR".parse().unwrap();
        let (losses, retreats) = apply_combat_result(&mut state, &board, &plan, result, &RulesConfig::default(), &mut rng)
            .unwrap();
        assert!(losses.contains(&(UnitId::from("knights"), UnitStatus::Depleted)));
        assert!(losses.contains(&(UnitId::from("ogres"), UnitStatus::Depleted)));
        assert_eq!(retreats.len(), 1);
        let ogres = state.units.unit(&UnitId::from("ogres")).unwrap();
        assert_eq!(ogres.position, Some(retreats[0].1));
        assert_eq!(retreats[0].1.distance(&target), 1);
        assert!(state.units.stack_at(&target).is_none());

        let (state_before, target) = battle(
            vec![Unit::new("knights", UnitKind::Cavalry, 6, 4)],
            vec![Unit::new("ogres", UnitKind::Infantry, 5, 3)],
            &board,
        );
        let mut state = state_before;
        let plan = plan_combat(&state, &board, &ids(&["knights"]), target).unwrap();
        let result: CombatResult = "-/E".parse().unwrap();
        apply_combat_result(&mut state, &board, &plan, result, &RulesConfig::default(), &mut rng).unwrap();
        let ogres = state.units.unit(&UnitId::from("ogres")).unwrap();
        assert_eq!(ogres.status, UnitStatus::Reserve);
        assert!(ogres.position.is_none());
        assert!(state.units.is_consistent());
    }

    #[test]
    fn test_resolve_combat_is_deterministic_per_seed() {
        let board = board();
        let table = table();
        let fight = |seed: u64| {
            let (mut state, target) = battle(
                vec![
                    Unit::new("knights", UnitKind::Cavalry, 6, 4),
                    Unit::new("footmen", UnitKind::Infantry, 4, 3),
                ],
                vec![Unit::new("ogres", UnitKind::Infantry, 5, 3)],
                &board,
            );
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let report = resolve_combat(
                &mut state,
                &board,
                &table,
                &ids(&["knights", "footmen"]),
                target,
                &RulesConfig::default(),
                &mut rng,
            )
            .unwrap();
            assert!(state.units.is_consistent());
            report
        };

        let report = fight(11);
        assert_eq!(report, fight(11));
        assert_eq!(report.plan.odds, Odds::TwoToOne);
        assert!((1..=10).contains(&report.roll));
        assert_eq!(report.modified_roll, report.roll as i32 + report.plan.modifiers.total());
        assert_eq!(report.result, table.lookup(report.modified_roll, Odds::TwoToOne));
    }
}
