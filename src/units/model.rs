//! Hex-indexed unit model
//!
//! Owns every counter and the stack on each occupied hex. All position
//! changes go through this type so that a unit's `position` and the stack
//! index never disagree: a unit with a position sits in exactly the stack at
//! that hex, and a unit without one sits in no stack.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::RulesConfig;
use crate::core::error::{GloryError, Result};
use crate::core::types::{Allegiance, CountryId, UnitId};
use crate::map::board::Board;
use crate::map::hex::HexCoord;
use crate::map::terrain::{MovementClass, TerrainCosts};
use crate::units::movement;
use crate::units::stack::{self, Selection, Stack};
use crate::units::unit::{Unit, UnitStatus};

/// All counters in play and the stacks they form
///
/// Stacks are not serialized; they are rebuilt from unit positions on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SavedUnits")]
pub struct UnitModel {
    units: AHashMap<UnitId, Unit>,
    #[serde(skip)]
    stacks: AHashMap<HexCoord, Stack>,
    /// Order in which units were added, for stable iteration
    order: Vec<UnitId>,
}

/// Serialized form of `UnitModel`
#[derive(Deserialize)]
struct SavedUnits {
    units: AHashMap<UnitId, Unit>,
    order: Vec<UnitId>,
}

impl From<SavedUnits> for UnitModel {
    fn from(saved: SavedUnits) -> Self {
        let mut model = Self {
            units: saved.units,
            stacks: AHashMap::new(),
            order: saved.order,
        };
        model.rebuild_stacks();
        model
    }
}

impl UnitModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a counter. If it already carries an on-map position it is placed
    /// in the stack at that hex.
    pub fn add_unit(&mut self, unit: Unit) {
        let id = unit.id.clone();
        if self.units.contains_key(&id) {
            self.detach(&id);
        } else {
            self.order.push(id.clone());
        }
        let position = if unit.is_on_map() { unit.position } else { None };
        let mut unit = unit;
        unit.position = None;
        self.units.insert(id.clone(), unit);
        if let Some(hex) = position {
            self.attach(&id, hex);
        }
    }

    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    fn unit_or_err(&self, id: &UnitId) -> Result<&Unit> {
        self.units
            .get(id)
            .ok_or_else(|| GloryError::UnknownUnit(id.clone()))
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.units.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.order.iter().filter_map(|id| self.units.get(id))
    }

    pub fn units_of_country<'a>(&'a self, country: &'a CountryId) -> impl Iterator<Item = &'a Unit> {
        self.iter().filter(move |u| u.country.as_ref() == Some(country))
    }

    pub fn stack_at(&self, hex: &HexCoord) -> Option<&Stack> {
        self.stacks.get(hex)
    }

    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.values()
    }

    /// Counters on a hex, top first
    pub fn units_at(&self, hex: &HexCoord) -> Vec<&Unit> {
        self.stacks
            .get(hex)
            .map(|s| s.units().iter().filter_map(|id| self.units.get(id)).collect())
            .unwrap_or_default()
    }

    /// Movement budget of the stack on `hex`
    pub fn movement_budget(&self, hex: &HexCoord) -> u32 {
        stack::movement_budget(self.units_at(hex))
    }

    /// Advance the selection cursor of the stack on `hex`
    pub fn select_next(&mut self, hex: &HexCoord) -> Option<Selection> {
        self.stacks.get_mut(hex).and_then(Stack::select_next)
    }

    /// Army units on `hex` that count against stacking, ignoring `excluding`
    pub fn army_count_at(&self, hex: &HexCoord, excluding: &[UnitId]) -> usize {
        self.units_at(hex)
            .into_iter()
            .filter(|u| u.kind.counts_for_stacking() && !excluding.contains(&u.id))
            .count()
    }

    /// True when a unit hostile to `side` stands on `hex`
    pub fn hostile_present(&self, hex: &HexCoord, side: Allegiance) -> bool {
        self.units_at(hex)
            .into_iter()
            .any(|u| u.allegiance.is_hostile_to(side))
    }

    /// Stacking and enemy-presence check for `movers` arriving on `hex`
    pub fn check_stacking(
        &self,
        movers: &[&Unit],
        hex: &HexCoord,
        config: &RulesConfig,
    ) -> std::result::Result<(), String> {
        if let Some(side) = movers.first().map(|u| u.allegiance) {
            if self.hostile_present(hex, side) {
                return Err("hex is occupied by enemy units".into());
            }
        }

        let mover_ids: Vec<UnitId> = movers.iter().map(|u| u.id.clone()).collect();
        let arriving = movers.iter().filter(|u| u.kind.counts_for_stacking()).count();
        let present = self.army_count_at(hex, &mover_ids);
        if present + arriving > config.max_army_units_per_hex {
            return Err(format!(
                "stacking limit of {} army units exceeded",
                config.max_army_units_per_hex
            ));
        }
        Ok(())
    }

    /// Put a ready unit on the board
    ///
    /// Fleets need open water or a coastal hex; a port printed on a hex that
    /// is not coastal does not qualify. Land units and flyers need a land hex.
    pub fn deploy(&mut self, id: &UnitId, hex: HexCoord, board: &Board, config: &RulesConfig) -> Result<()> {
        let unit = self.unit_or_err(id)?;
        let illegal = |reason: String| GloryError::IllegalDeployment {
            unit: id.clone(),
            hex,
            reason,
        };

        if !unit.is_deployable() && !unit.is_on_map() {
            return Err(illegal(format!("unit is {:?}", unit.status)));
        }

        let Some(tile) = board.tile(&hex) else {
            return Err(illegal("hex is not on the board".into()));
        };

        let class = unit.movement_class();
        if !board.can_occupy(class, &hex) {
            let reason = match class {
                MovementClass::Naval if tile.is_port() => "port is not on the coast".to_string(),
                MovementClass::Naval => "fleets need a coastal or sea hex".to_string(),
                _ => format!("cannot occupy {:?}", tile.terrain),
            };
            return Err(illegal(reason));
        }

        self.check_stacking(&[unit], &hex, config).map_err(illegal)?;

        self.detach(id);
        self.attach(id, hex);
        if let Some(unit) = self.units.get_mut(id) {
            if !unit.is_on_map() {
                unit.status = UnitStatus::Active;
            }
        }
        info!(unit = %id, hex = %hex, "Deployed unit");
        Ok(())
    }

    /// Move a group of co-located units as one commit
    ///
    /// Every mover is validated before anything changes; on error the model
    /// is untouched. Each mover pays the path cost of the group.
    pub fn move_units(
        &mut self,
        ids: &[UnitId],
        target: HexCoord,
        board: &Board,
        costs: &TerrainCosts,
        config: &RulesConfig,
    ) -> Result<u32> {
        if ids.is_empty() {
            return Err(GloryError::IllegalMove("no units selected".into()));
        }
        let mut seen = AHashSet::new();
        if let Some(dup) = ids.iter().find(|id| !seen.insert(*id)) {
            return Err(GloryError::IllegalMove(format!("{} selected more than once", dup)));
        }

        let mut start = None;
        for id in ids {
            let unit = self.unit_or_err(id)?;
            let Some(position) = unit.position else {
                return Err(GloryError::IllegalMove(format!("{} is not on the map", id)));
            };
            match start {
                None => start = Some(position),
                Some(s) if s != position => {
                    return Err(GloryError::IllegalMove(
                        "selected units are not in the same hex".into(),
                    ))
                }
                _ => {}
            }
        }
        let Some(start) = start else {
            return Err(GloryError::IllegalMove("no units selected".into()));
        };

        let cost = movement::path_cost(self, ids, start, target, board, costs, config)
            .ok_or_else(|| GloryError::IllegalMove(format!("{} is out of reach", target)))?;

        for id in ids {
            self.detach(id);
            self.attach(id, target);
            if let Some(unit) = self.units.get_mut(id) {
                unit.spend_movement(cost);
            }
        }
        info!(units = ids.len(), from = %start, to = %target, cost, "Moved stack");
        Ok(cost)
    }

    /// Take a counter off the board (destroyed, sent to reserve)
    pub fn remove_from_map(&mut self, id: &UnitId) {
        self.detach(id);
    }

    /// Apply one step of losses; counters leaving play are lifted off the board
    pub fn apply_combat_loss(&mut self, id: &UnitId) -> Result<UnitStatus> {
        let unit = self
            .units
            .get_mut(id)
            .ok_or_else(|| GloryError::UnknownUnit(id.clone()))?;
        unit.apply_combat_loss();
        let status = unit.status;
        if !unit.is_on_map() {
            self.detach(id);
        }
        Ok(status)
    }

    /// Elimination result: the counter leaves the board for reserve, or for
    /// good if it is a leader, hero or wing
    pub fn eliminate_unit(&mut self, id: &UnitId) -> Result<UnitStatus> {
        let unit = self
            .units
            .get_mut(id)
            .ok_or_else(|| GloryError::UnknownUnit(id.clone()))?;
        unit.eliminate();
        let status = unit.status;
        self.detach(id);
        Ok(status)
    }

    /// Whether an on-map counter may retreat into the adjacent `hex`
    pub fn can_retreat_to(&self, id: &UnitId, hex: &HexCoord, board: &Board, config: &RulesConfig) -> bool {
        let Some(unit) = self.units.get(id) else {
            return false;
        };
        let Some(from) = unit.position else {
            return false;
        };
        from.distance(hex) == 1
            && board.can_occupy(unit.movement_class(), hex)
            && self.check_stacking(&[unit], hex, config).is_ok()
    }

    /// Push a counter into an adjacent hex without spending movement
    pub fn retreat_unit(&mut self, id: &UnitId, hex: HexCoord, board: &Board, config: &RulesConfig) -> Result<()> {
        self.unit_or_err(id)?;
        if !self.can_retreat_to(id, &hex, board, config) {
            return Err(GloryError::IllegalMove(format!("{} cannot retreat to {}", id, hex)));
        }
        self.detach(id);
        self.attach(id, hex);
        info!(unit = %id, hex = %hex, "Unit retreated");
        Ok(())
    }

    /// Make an off-board counter available for deployment
    ///
    /// Only counters off the board and waiting (inactive, in reserve or
    /// already ready) qualify, and only those of `side` or of no side yet.
    pub fn ready_unit(&mut self, id: &UnitId, side: Allegiance) -> Result<()> {
        let unit = self
            .units
            .get_mut(id)
            .ok_or_else(|| GloryError::UnknownUnit(id.clone()))?;
        let unavailable = |reason: String| GloryError::UnitUnavailable {
            unit: id.clone(),
            reason,
        };
        if unit.position.is_some() {
            return Err(unavailable("unit is already on the board".into()));
        }
        if !matches!(unit.status, UnitStatus::Inactive | UnitStatus::Reserve | UnitStatus::Ready) {
            return Err(unavailable(format!("unit is {:?}", unit.status)));
        }
        if unit.allegiance.is_hostile_to(side) {
            return Err(unavailable(format!("unit fights for {}", unit.allegiance)));
        }

        unit.status = UnitStatus::Ready;
        if !side.is_neutral() {
            unit.allegiance = side;
        }
        debug!(unit = %id, side = %side, "Unit ready");
        Ok(())
    }

    /// Switch every unit of `country` to `side`, readying inactive ones
    pub fn activate_country_units(&mut self, country: &CountryId, side: Allegiance) -> usize {
        let mut count = 0;
        for unit in self.units.values_mut() {
            if unit.country.as_ref() == Some(country) {
                unit.allegiance = side;
                if unit.status == UnitStatus::Inactive {
                    unit.status = UnitStatus::Ready;
                }
                count += 1;
            }
        }
        count
    }

    pub fn refresh_movement(&mut self) {
        for unit in self.units.values_mut() {
            unit.refresh_movement();
        }
    }

    /// Every positioned unit sits in the matching stack and every stacked
    /// unit carries that position
    pub fn is_consistent(&self) -> bool {
        let stacked: usize = self.stacks.values().map(Stack::len).sum();
        let positioned = self.units.values().filter(|u| u.position.is_some()).count();
        if stacked != positioned {
            return false;
        }
        self.stacks.iter().all(|(hex, stack)| {
            !stack.is_empty()
                && stack.hex == *hex
                && stack
                    .units()
                    .iter()
                    .all(|id| self.units.get(id).and_then(|u| u.position) == Some(*hex))
        })
    }

    /// Rebuild the stack index from unit positions
    pub fn rebuild_stacks(&mut self) {
        self.stacks.clear();
        for id in &self.order {
            if let Some(hex) = self.units.get(id).and_then(|u| u.position) {
                self.stacks
                    .entry(hex)
                    .or_insert_with(|| Stack::new(hex))
                    .push(id.clone());
            }
        }
    }

    fn attach(&mut self, id: &UnitId, hex: HexCoord) {
        if let Some(unit) = self.units.get_mut(id) {
            unit.position = Some(hex);
            self.stacks
                .entry(hex)
                .or_insert_with(|| Stack::new(hex))
                .push(id.clone());
        }
    }

    fn detach(&mut self, id: &UnitId) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        if let Some(hex) = unit.position.take() {
            if let Some(stack) = self.stacks.get_mut(&hex) {
                stack.remove(id);
                if stack.is_empty() {
                    self.stacks.remove(&hex);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::board::{LocationKind, Tile};
    use crate::map::terrain::Terrain;
    use crate::units::unit::UnitKind;

    fn coast_board() -> Board {
        let mut board = Board::filled(6, 4, Terrain::Grassland);
        for col in 0..6 {
            board.set_terrain(HexCoord::from_offset(col, 0), Terrain::Ocean);
        }
        board
    }

    fn ready(unit: Unit) -> Unit {
        unit.with_allegiance(Allegiance::Whitestone)
            .with_status(UnitStatus::Ready)
    }

    #[test]
    fn test_deploy_places_unit_in_stack() {
        let board = coast_board();
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("inf", UnitKind::Infantry, 4, 3)));

        let hex = HexCoord::from_offset(2, 2);
        model.deploy(&UnitId::from("inf"), hex, &board, &config).unwrap();

        assert_eq!(model.units_at(&hex).len(), 1);
        assert_eq!(model.unit(&UnitId::from("inf")).unwrap().status, UnitStatus::Active);
        assert!(model.is_consistent());
    }

    #[test]
    fn test_fleet_rejected_inland_accepted_on_coast() {
        let board = coast_board();
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("fleet", UnitKind::Fleet, 2, 6)));
        let id = UnitId::from("fleet");

        let err = model
            .deploy(&id, HexCoord::from_offset(2, 3), &board, &config)
            .unwrap_err();
        assert!(matches!(err, GloryError::IllegalDeployment { .. }));
        assert!(err.is_recoverable());

        model.deploy(&id, HexCoord::from_offset(2, 1), &board, &config).unwrap();
    }

    #[test]
    fn test_fleet_rejected_at_non_coastal_port() {
        let mut board = coast_board();
        let port = HexCoord::from_offset(3, 1);
        board.insert(
            Tile::new(port, Terrain::Grassland)
                .with_coastal(false)
                .with_location("inland_port", LocationKind::Port),
        );
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("fleet", UnitKind::Fleet, 2, 6)));

        let err = model
            .deploy(&UnitId::from("fleet"), port, &board, &config)
            .unwrap_err();
        match err {
            GloryError::IllegalDeployment { reason, .. } => assert!(reason.contains("port")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_land_unit_rejected_at_sea() {
        let board = coast_board();
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("inf", UnitKind::Infantry, 4, 3)));

        let result = model.deploy(&UnitId::from("inf"), HexCoord::from_offset(1, 0), &board, &config);
        assert!(matches!(result, Err(GloryError::IllegalDeployment { .. })));
        assert!(model.unit(&UnitId::from("inf")).unwrap().position.is_none());
    }

    #[test]
    fn test_stacking_limit_on_deploy() {
        let board = coast_board();
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        let hex = HexCoord::from_offset(3, 2);
        for id in ["a", "b", "c"] {
            model.add_unit(ready(Unit::new(id, UnitKind::Infantry, 2, 3)));
        }
        model.add_unit(ready(Unit::new("gen", UnitKind::General, 0, 4)));

        model.deploy(&UnitId::from("a"), hex, &board, &config).unwrap();
        model.deploy(&UnitId::from("b"), hex, &board, &config).unwrap();
        assert!(model.deploy(&UnitId::from("c"), hex, &board, &config).is_err());
        // Leaders stack for free
        model.deploy(&UnitId::from("gen"), hex, &board, &config).unwrap();
        assert_eq!(model.units_at(&hex).len(), 3);
    }

    #[test]
    fn test_cannot_deploy_onto_enemy() {
        let board = coast_board();
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        let hex = HexCoord::from_offset(3, 2);
        model.add_unit(
            Unit::new("dragonarmy", UnitKind::Infantry, 5, 3)
                .with_allegiance(Allegiance::Highlord)
                .with_status(UnitStatus::Ready),
        );
        model.add_unit(ready(Unit::new("knights", UnitKind::Cavalry, 4, 5)));

        model.deploy(&UnitId::from("dragonarmy"), hex, &board, &config).unwrap();
        assert!(model.deploy(&UnitId::from("knights"), hex, &board, &config).is_err());
    }

    #[test]
    fn test_inactive_unit_cannot_deploy() {
        let board = coast_board();
        let mut model = UnitModel::new();
        model.add_unit(Unit::new("sleeper", UnitKind::Infantry, 2, 3));
        let result = model.deploy(
            &UnitId::from("sleeper"),
            HexCoord::from_offset(2, 2),
            &board,
            &RulesConfig::default(),
        );
        assert!(matches!(result, Err(GloryError::IllegalDeployment { .. })));
    }

    #[test]
    fn test_combat_loss_lifts_counter_off_board() {
        let board = coast_board();
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("hero", UnitKind::Hero, 3, 4)));
        let id = UnitId::from("hero");
        let hex = HexCoord::from_offset(2, 2);
        model.deploy(&id, hex, &board, &config).unwrap();

        assert_eq!(model.apply_combat_loss(&id).unwrap(), UnitStatus::Destroyed);
        assert!(model.stack_at(&hex).is_none());
        assert!(model.is_consistent());
    }

    #[test]
    fn test_redeploy_moves_between_stacks() {
        let board = coast_board();
        let config = RulesConfig::default();
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("inf", UnitKind::Infantry, 4, 3)));
        let id = UnitId::from("inf");

        model.deploy(&id, HexCoord::from_offset(2, 2), &board, &config).unwrap();
        model.deploy(&id, HexCoord::from_offset(4, 2), &board, &config).unwrap();

        assert!(model.stack_at(&HexCoord::from_offset(2, 2)).is_none());
        assert_eq!(model.units_at(&HexCoord::from_offset(4, 2)).len(), 1);
        assert!(model.is_consistent());
    }

    #[test]
    fn test_activate_country_units() {
        let mut model = UnitModel::new();
        model.add_unit(Unit::new("qual_1", UnitKind::Infantry, 3, 3).with_country("qualinesti"));
        model.add_unit(Unit::new("qual_2", UnitKind::Infantry, 3, 3).with_country("qualinesti"));
        model.add_unit(Unit::new("ergoth_1", UnitKind::Infantry, 3, 3).with_country("ergoth"));

        let activated = model.activate_country_units(&CountryId::from("qualinesti"), Allegiance::Whitestone);
        assert_eq!(activated, 2);
        assert!(model
            .units_of_country(&CountryId::from("qualinesti"))
            .all(|u| u.status == UnitStatus::Ready && u.allegiance == Allegiance::Whitestone));
        assert_eq!(
            model.unit(&UnitId::from("ergoth_1")).unwrap().status,
            UnitStatus::Inactive
        );
    }

    #[test]
    fn test_ready_unit_from_reserve() {
        let mut model = UnitModel::new();
        model.add_unit(
            Unit::new("silver_wing", UnitKind::Wing, 6, 6)
                .with_allegiance(Allegiance::Whitestone)
                .with_status(UnitStatus::Reserve),
        );
        model.add_unit(Unit::new("mercenaries", UnitKind::Infantry, 2, 3));

        model.ready_unit(&UnitId::from("silver_wing"), Allegiance::Whitestone).unwrap();
        model.ready_unit(&UnitId::from("mercenaries"), Allegiance::Highlord).unwrap();

        assert_eq!(model.unit(&UnitId::from("silver_wing")).unwrap().status, UnitStatus::Ready);
        let mercs = model.unit(&UnitId::from("mercenaries")).unwrap();
        assert_eq!(mercs.status, UnitStatus::Ready);
        assert_eq!(mercs.allegiance, Allegiance::Highlord);
    }

    #[test]
    fn test_ready_unit_refuses_enemy_counter_on_board() {
        let board = coast_board();
        let config = RulesConfig::default();
        let hex = HexCoord::from_offset(2, 2);
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("knights", UnitKind::Cavalry, 5, 4)));
        model.add_unit(ready(Unit::new("footmen", UnitKind::Infantry, 3, 3)));
        model.deploy(&UnitId::from("knights"), hex, &board, &config).unwrap();
        model.deploy(&UnitId::from("footmen"), hex, &board, &config).unwrap();

        let result = model.ready_unit(&UnitId::from("knights"), Allegiance::Highlord);
        assert!(matches!(result, Err(GloryError::UnitUnavailable { .. })));
        assert!(!model.hostile_present(&hex, Allegiance::Whitestone));
        let knights = model.unit(&UnitId::from("knights")).unwrap();
        assert_eq!(knights.allegiance, Allegiance::Whitestone);
        assert_eq!(knights.status, UnitStatus::Active);
    }

    #[test]
    fn test_ready_unit_refuses_enemy_reserve_and_destroyed() {
        let mut model = UnitModel::new();
        model.add_unit(
            Unit::new("citadel_1", UnitKind::Citadel, 8, 3)
                .with_allegiance(Allegiance::Highlord)
                .with_status(UnitStatus::Reserve),
        );
        model.add_unit(ready(Unit::new("fallen", UnitKind::Hero, 3, 4)).with_status(UnitStatus::Destroyed));

        assert!(model.ready_unit(&UnitId::from("citadel_1"), Allegiance::Whitestone).is_err());
        assert!(model.ready_unit(&UnitId::from("fallen"), Allegiance::Whitestone).is_err());
        assert_eq!(model.unit(&UnitId::from("citadel_1")).unwrap().status, UnitStatus::Reserve);
    }

    #[test]
    fn test_move_rejects_duplicate_ids() {
        let board = coast_board();
        let config = RulesConfig::default();
        let start = HexCoord::from_offset(2, 2);
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("inf", UnitKind::Infantry, 4, 3)));
        let id = UnitId::from("inf");
        model.deploy(&id, start, &board, &config).unwrap();

        let target = start.neighbors()[3];
        let result = model.move_units(&[id.clone(), id.clone()], target, &board, &TerrainCosts::default(), &config);
        assert!(matches!(result, Err(GloryError::IllegalMove(_))));
        assert_eq!(model.unit(&id).unwrap().position, Some(start));
        assert_eq!(model.unit(&id).unwrap().movement_points, 3);
        assert!(model.is_consistent());
    }

    #[test]
    fn test_deserialized_model_has_stacks() {
        let board = coast_board();
        let config = RulesConfig::default();
        let hex = HexCoord::from_offset(3, 2);
        let mut model = UnitModel::new();
        model.add_unit(ready(Unit::new("a", UnitKind::Infantry, 4, 3)));
        model.add_unit(ready(Unit::new("b", UnitKind::Cavalry, 4, 5)));
        model.deploy(&UnitId::from("a"), hex, &board, &config).unwrap();
        model.deploy(&UnitId::from("b"), hex, &board, &config).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let loaded: UnitModel = serde_json::from_str(&json).unwrap();
        assert!(loaded.is_consistent());
        let ids: Vec<_> = loaded.units_at(&hex).iter().map(|u| u.id.clone()).collect();
        assert_eq!(ids, vec![UnitId::from("a"), UnitId::from("b")]);
    }
}
