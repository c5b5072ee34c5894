//! Movement range search
//!
//! A group of co-located units moves as one: it is bounded by the smallest
//! remaining movement of its members, pays the highest entry cost among its
//! members for every hex, may only pass hexes every member can traverse and
//! may only stop where every member can stand and stacking allows.

use ahash::AHashMap;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::core::config::RulesConfig;
use crate::core::types::UnitId;
use crate::map::board::Board;
use crate::map::hex::HexCoord;
use crate::map::terrain::TerrainCosts;
use crate::units::model::UnitModel;
use crate::units::stack::movement_budget;
use crate::units::unit::Unit;

#[derive(PartialEq, Eq)]
struct Node {
    coord: HexCoord,
    cost: u32,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost, ties broken by coordinate for determinism
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest cost for the group to reach every hex within its budget
fn reachable(
    movers: &[&Unit],
    start: HexCoord,
    board: &Board,
    costs: &TerrainCosts,
    model: &UnitModel,
) -> AHashMap<HexCoord, u32> {
    let mut best: AHashMap<HexCoord, u32> = AHashMap::new();
    let Some(side) = movers.first().map(|u| u.allegiance) else {
        return best;
    };
    let budget = movement_budget(movers.iter().copied());

    let mut open = BinaryHeap::new();
    best.insert(start, 0);
    open.push(Node { coord: start, cost: 0 });

    while let Some(Node { coord, cost }) = open.pop() {
        if cost > *best.get(&coord).unwrap_or(&u32::MAX) {
            continue;
        }

        for next in board.neighbors(&coord) {
            if model.hostile_present(&next, side) {
                continue;
            }
            if !movers.iter().all(|u| board.can_traverse(u.movement_class(), &next)) {
                continue;
            }
            let Some(terrain) = board.terrain(&next) else {
                continue;
            };
            let step = movers
                .iter()
                .map(|u| costs.entry_cost(u.movement_class(), terrain))
                .try_fold(0u32, |acc, c| c.map(|c| acc.max(c)));
            let Some(step) = step else {
                continue;
            };

            let Some(total) = cost.checked_add(step).filter(|t| *t <= budget) else {
                continue;
            };
            if total < *best.get(&next).unwrap_or(&u32::MAX) {
                best.insert(next, total);
                open.push(Node { coord: next, cost: total });
            }
        }
    }

    best
}

fn collect_movers<'a>(model: &'a UnitModel, ids: &[UnitId]) -> Option<Vec<&'a Unit>> {
    ids.iter().map(|id| model.unit(id)).collect()
}

fn can_stop(movers: &[&Unit], hex: &HexCoord, board: &Board, model: &UnitModel, config: &RulesConfig) -> bool {
    movers.iter().all(|u| board.can_occupy(u.movement_class(), hex))
        && model.check_stacking(movers, hex, config).is_ok()
}

/// Hexes the given units can end a move on, starting from `start`
///
/// The start hex itself is not included.
pub fn legal_destinations(
    model: &UnitModel,
    ids: &[UnitId],
    start: HexCoord,
    board: &Board,
    costs: &TerrainCosts,
    config: &RulesConfig,
) -> HashSet<HexCoord> {
    let Some(movers) = collect_movers(model, ids) else {
        return HashSet::new();
    };

    reachable(&movers, start, board, costs, model)
        .into_keys()
        .filter(|hex| *hex != start)
        .filter(|hex| can_stop(&movers, hex, board, model, config))
        .collect()
}

/// Movement cost for the units to reach `target`, or `None` if they cannot
/// legally end their move there
pub fn path_cost(
    model: &UnitModel,
    ids: &[UnitId],
    start: HexCoord,
    target: HexCoord,
    board: &Board,
    costs: &TerrainCosts,
    config: &RulesConfig,
) -> Option<u32> {
    if start == target {
        return None;
    }
    let movers = collect_movers(model, ids)?;
    if !can_stop(&movers, &target, board, model, config) {
        return None;
    }
    reachable(&movers, start, board, costs, model).get(&target).copied()
}
