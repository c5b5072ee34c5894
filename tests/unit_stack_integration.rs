//! Integration tests for units, stacks and movement
//!
//! Covers the board-facing rules a presentation layer relies on:
//! - stack movement budget and selection cycling
//! - deployment legality (coast, terrain, stacking, enemy hexes)
//! - legal destinations and all-or-nothing multi-unit moves

use dragons_of_glory::core::config::RulesConfig;
use dragons_of_glory::core::error::GloryError;
use dragons_of_glory::core::types::{Allegiance, UnitId};
use dragons_of_glory::map::{Board, HexCoord, LocationKind, Terrain, TerrainCosts, Tile};
use dragons_of_glory::units::{legal_destinations, Selection, Unit, UnitKind, UnitModel, UnitStatus};

fn ready(id: &str, kind: UnitKind, movement: u32) -> Unit {
    Unit::new(id, kind, 3, movement)
        .with_allegiance(Allegiance::Whitestone)
        .with_status(UnitStatus::Ready)
}

/// Row 0 is sea, everything else grassland
fn coastal_board() -> Board {
    let mut board = Board::filled(8, 6, Terrain::Grassland);
    for col in 0..8 {
        board.set_terrain(HexCoord::from_offset(col, 0), Terrain::Ocean);
    }
    board
}

#[test]
fn test_stack_budget_is_slowest_member() {
    let board = coastal_board();
    let config = RulesConfig {
        max_army_units_per_hex: 3,
        ..RulesConfig::default()
    };
    let hex = HexCoord::from_offset(4, 3);
    let mut model = UnitModel::new();
    for (id, mv) in [("a", 4), ("b", 6), ("c", 3)] {
        model.add_unit(ready(id, UnitKind::Infantry, mv));
        model.deploy(&UnitId::from(id), hex, &board, &config).unwrap();
    }
    assert_eq!(model.movement_budget(&hex), 3);
}

#[test]
fn test_select_next_cycles_two_unit_stack() {
    let board = coastal_board();
    let config = RulesConfig::default();
    let hex = HexCoord::from_offset(2, 2);
    let mut model = UnitModel::new();
    model.add_unit(ready("first", UnitKind::Infantry, 3));
    model.add_unit(ready("second", UnitKind::Cavalry, 5));
    model.deploy(&UnitId::from("first"), hex, &board, &config).unwrap();
    model.deploy(&UnitId::from("second"), hex, &board, &config).unwrap();

    let picks: Vec<_> = (0..4).map(|_| model.select_next(&hex)).collect();
    assert_eq!(
        picks,
        vec![
            Some(Selection::WholeStack),
            Some(Selection::Unit(UnitId::from("first"))),
            Some(Selection::Unit(UnitId::from("second"))),
            Some(Selection::Unit(UnitId::from("first"))),
        ]
    );
    assert_eq!(model.select_next(&HexCoord::from_offset(7, 5)), None);
}

#[test]
fn test_fleet_needs_coastal_port() {
    let mut board = coastal_board();
    let inland_port = HexCoord::from_offset(4, 4);
    board.insert(
        Tile::new(inland_port, Terrain::Grassland)
            .with_location("lake_port", LocationKind::Port)
            .with_coastal(false),
    );
    let coastal_port = HexCoord::from_offset(3, 1);
    board.insert(Tile::new(coastal_port, Terrain::Grassland).with_location("kalaman", LocationKind::Port));

    let config = RulesConfig::default();
    let mut model = UnitModel::new();
    model.add_unit(ready("fleet", UnitKind::Fleet, 5));
    let fleet = UnitId::from("fleet");

    match model.deploy(&fleet, inland_port, &board, &config) {
        Err(err @ GloryError::IllegalDeployment { .. }) => assert!(err.is_recoverable()),
        other => panic!("unexpected: {other:?}"),
    }
    assert!(model.unit(&fleet).unwrap().position.is_none());

    model.deploy(&fleet, coastal_port, &board, &config).unwrap();
    assert_eq!(model.unit(&fleet).unwrap().position, Some(coastal_port));
}

#[test]
fn test_land_unit_cannot_deploy_at_sea() {
    let board = coastal_board();
    let mut model = UnitModel::new();
    model.add_unit(ready("inf", UnitKind::Infantry, 3));
    let result = model.deploy(
        &UnitId::from("inf"),
        HexCoord::from_offset(2, 0),
        &board,
        &RulesConfig::default(),
    );
    assert!(matches!(result, Err(GloryError::IllegalDeployment { .. })));
}

#[test]
fn test_move_is_all_or_nothing() {
    let mut board = coastal_board();
    let start = HexCoord::from_offset(3, 3);
    let mountain = start.neighbors()[0];
    board.set_terrain(mountain, Terrain::Mountain);
    let config = RulesConfig::default();
    let costs = TerrainCosts::default();

    let mut model = UnitModel::new();
    model.add_unit(ready("cav", UnitKind::Cavalry, 5));
    model.add_unit(ready("inf", UnitKind::Infantry, 2));
    let ids = [UnitId::from("cav"), UnitId::from("inf")];
    for id in &ids {
        model.deploy(id, start, &board, &config).unwrap();
    }

    // Mountain costs 4; the infantry's 2 points bind the stack
    let before = model.clone();
    let result = model.move_units(&ids, mountain, &board, &costs, &config);
    assert!(matches!(result, Err(GloryError::IllegalMove(_))));
    assert_eq!(model.units_at(&start).len(), 2);
    assert_eq!(
        model.unit(&ids[0]).unwrap().movement_points,
        before.unit(&ids[0]).unwrap().movement_points
    );

    let target = start.neighbors()[3];
    assert!(legal_destinations(&model, &ids, start, &board, &costs, &config).contains(&target));
    let cost = model.move_units(&ids, target, &board, &costs, &config).unwrap();
    assert_eq!(cost, 1);
    assert!(model.stack_at(&start).is_none());
    assert_eq!(model.units_at(&target).len(), 2);
    assert_eq!(model.unit(&ids[1]).unwrap().movement_points, 1);
    assert!(model.is_consistent());
}

#[test]
fn test_enemy_hex_refuses_deployment() {
    let board = coastal_board();
    let config = RulesConfig::default();
    let hex = HexCoord::from_offset(5, 4);
    let mut model = UnitModel::new();
    model.add_unit(
        Unit::new("draconians", UnitKind::Infantry, 4, 3)
            .with_allegiance(Allegiance::Highlord)
            .with_status(UnitStatus::Ready),
    );
    model.deploy(&UnitId::from("draconians"), hex, &board, &config).unwrap();

    model.add_unit(ready("knights", UnitKind::Cavalry, 4));
    let result = model.deploy(&UnitId::from("knights"), hex, &board, &config);
    assert!(matches!(result, Err(GloryError::IllegalDeployment { .. })));
}
