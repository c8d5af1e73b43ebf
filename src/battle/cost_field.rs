//! Movement cost field: hop counts from one source tile by flood fill
//!
//! Every step between neighbouring tiles costs 1. The field is rebuilt from
//! scratch whenever its source changes; nothing is updated incrementally.

use serde::{Deserialize, Serialize};

use crate::battle::battle_map::BattleMap;
use crate::battle::constants::UNREACHABLE_COST;
use crate::battle::hex::HexCoord;

/// Per-tile hop counts from a single source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostField {
    width: u32,
    height: u32,
    costs: Vec<u32>,
    source: Option<HexCoord>,
    /// Sentinel for unreachable tiles; above any real hop count on this grid
    unreachable: u32,
}

impl CostField {
    /// A field with every tile unreachable
    ///
    /// The sentinel is `UNREACHABLE_COST`, or the tile count on grids large
    /// enough for a real path to reach it.
    pub fn new(width: u32, height: u32) -> Self {
        let count = (width as usize).saturating_mul(height as usize);
        let unreachable = UNREACHABLE_COST.max(u32::try_from(count).unwrap_or(u32::MAX));
        Self {
            width,
            height,
            costs: vec![unreachable; count],
            source: None,
            unreachable,
        }
    }

    pub fn for_map(map: &BattleMap) -> Self {
        Self::new(map.width(), map.height())
    }

    pub fn source(&self) -> Option<HexCoord> {
        self.source
    }

    /// Cost reported for tiles the flood never reached
    pub fn unreachable_cost(&self) -> u32 {
        self.unreachable
    }

    /// Mark every tile unreachable and forget the source
    pub fn clear(&mut self) {
        self.costs.fill(self.unreachable);
        self.source = None;
    }

    /// Flood fill from `source` across selectable tiles
    ///
    /// Pass `n` relaxes the neighbours of every tile holding cost `n`. Stops on
    /// the first pass that changes nothing, or after `pass_limit` passes;
    /// tiles still at the sentinel are unreachable.
    pub fn populate(&mut self, map: &BattleMap, source: HexCoord, pass_limit: u32) {
        self.clear();
        let Some(source_index) = map.tile_index(source) else {
            return;
        };
        self.source = Some(source);
        self.costs[source_index] = 0;

        let passable: Vec<bool> = map.tiles().iter().map(|t| map.is_selectable(t.coord)).collect();

        let mut passes = 0;
        for pass in 0..pass_limit {
            passes = pass + 1;
            let mut changed = false;

            for index in 0..self.costs.len() {
                if self.costs[index] != pass {
                    continue;
                }
                for neighbor in self.coord_of(index).neighbors() {
                    let Some(n) = map.tile_index(neighbor) else {
                        continue;
                    };
                    if passable[n] && self.costs[n] > pass + 1 {
                        self.costs[n] = pass + 1;
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        tracing::debug!("Flood fill from {} settled after {} passes", source, passes);
    }

    /// Cost at a coordinate; off-grid coordinates are unreachable
    pub fn cost_at(&self, coord: HexCoord) -> u32 {
        self.index_of(coord)
            .map(|i| self.costs[i])
            .unwrap_or(self.unreachable)
    }

    pub fn is_reachable(&self, coord: HexCoord) -> bool {
        self.cost_at(coord) < self.unreachable
    }

    /// Every tile with cost at most `range`, in row-major order
    pub fn reachable_within(&self, range: u32) -> Vec<HexCoord> {
        self.costs
            .iter()
            .enumerate()
            .filter(|(_, cost)| **cost <= range && **cost < self.unreachable)
            .map(|(index, _)| self.coord_of(index))
            .collect()
    }

    /// Every tile whose cost lies in `[min, max]`
    pub fn within_band(&self, min: u32, max: u32) -> Vec<HexCoord> {
        self.costs
            .iter()
            .enumerate()
            .filter(|(_, cost)| **cost >= min && **cost <= max && **cost < self.unreachable)
            .map(|(index, _)| self.coord_of(index))
            .collect()
    }

    /// Walk back from `target` to the source, source first
    ///
    /// Each step goes to the selectable neighbour with the strictly smallest
    /// cost; neighbours are checked in `HexDirection::ALL` order, so the
    /// earliest one wins ties. Returns `None` if the target is unreachable.
    pub fn path_to(&self, map: &BattleMap, target: HexCoord) -> Option<Vec<HexCoord>> {
        if !self.is_reachable(target) {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        let mut current_cost = self.cost_at(target);

        while current_cost > 0 {
            let mut best: Option<(HexCoord, u32)> = None;
            for neighbor in current.neighbors() {
                if !map.is_selectable(neighbor) && Some(neighbor) != self.source {
                    continue;
                }
                let cost = self.cost_at(neighbor);
                let threshold = best.map_or(current_cost, |(_, c)| c);
                if cost < threshold {
                    best = Some((neighbor, cost));
                }
            }

            // No downhill neighbour: the field and map disagree
            let (next, cost) = best?;
            path.push(next);
            current = next;
            current_cost = cost;
        }

        path.reverse();
        Some(path)
    }

    fn index_of(&self, coord: HexCoord) -> Option<usize> {
        let in_grid = coord.col >= 0
            && coord.row >= 0
            && coord.col < self.width as i32
            && coord.row < self.height as i32;
        in_grid.then(|| coord.row as usize * self.width as usize + coord.col as usize)
    }

    fn coord_of(&self, index: usize) -> HexCoord {
        let width = self.width as usize;
        HexCoord::new((index % width) as i32, (index / width) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::definitions::{Definitions, MapDefinition};
    use crate::battle::terrain::TileKind;
    use std::sync::Arc;

    fn build(def: MapDefinition) -> BattleMap {
        let tiles = vec![
            TileKind::new("Grass", '.', false),
            TileKind::new("Blocked", '#', true),
        ];
        let name = def.name.clone();
        let defs = Arc::new(Definitions::new(tiles, Vec::new(), vec![def]).unwrap());
        BattleMap::new(defs, &name).unwrap()
    }

    #[test]
    fn test_open_map_matches_hex_distance() {
        let map = build(MapDefinition::open("Open", 12, 12));
        let source = HexCoord::new(5, 6);
        let mut field = CostField::for_map(&map);
        field.populate(&map, source, 999);

        for tile in map.tiles() {
            assert_eq!(field.cost_at(tile.coord), source.taxicab_distance(&tile.coord));
        }
    }

    #[test]
    fn test_source_costs_zero() {
        let map = build(MapDefinition::open("Open", 4, 4));
        let mut field = CostField::for_map(&map);
        field.populate(&map, HexCoord::new(3, 3), 999);
        assert_eq!(field.cost_at(HexCoord::new(3, 3)), 0);
        assert_eq!(field.source(), Some(HexCoord::new(3, 3)));
    }

    #[test]
    fn test_ring_of_blocked_tiles_isolates_source() {
        let center = HexCoord::new(5, 5);
        let mut def = MapDefinition::open("Ring", 12, 12);
        for neighbor in center.neighbors() {
            def = def.with_tile(neighbor, '#');
        }
        let map = build(def);
        let mut field = CostField::for_map(&map);
        field.populate(&map, center, 999);

        for tile in map.tiles() {
            let expected = if tile.coord == center { 0 } else { UNREACHABLE_COST };
            assert_eq!(field.cost_at(tile.coord), expected, "tile {}", tile.coord);
        }
    }

    #[test]
    fn test_wall_forces_detour() {
        // Column 2 blocked except the top row
        let mut def = MapDefinition::open("Wall", 5, 5);
        for row in 0..4 {
            def = def.with_tile(HexCoord::new(2, row), '#');
        }
        let map = build(def);
        let mut field = CostField::for_map(&map);
        field.populate(&map, HexCoord::new(0, 0), 999);

        let target = HexCoord::new(4, 0);
        assert!(field.cost_at(target) > HexCoord::new(0, 0).taxicab_distance(&target));
        assert_eq!(field.cost_at(HexCoord::new(2, 1)), UNREACHABLE_COST);

        let path = field.path_to(&map, target).unwrap();
        assert_eq!(path.first(), Some(&HexCoord::new(0, 0)));
        assert_eq!(path.last(), Some(&target));
        assert_eq!(path.len() as u32, field.cost_at(target) + 1);
        assert!(path.iter().all(|c| map.is_selectable(*c)));
    }

    #[test]
    fn test_path_tie_break_uses_neighbor_order() {
        let map = build(MapDefinition::open("Open", 6, 6));
        let mut field = CostField::for_map(&map);
        field.populate(&map, HexCoord::new(0, 0), 999);

        // (1,1) is two steps away via (0,1) or (1,0); South is checked before SouthWest
        let path = field.path_to(&map, HexCoord::new(1, 1)).unwrap();
        assert_eq!(path, vec![HexCoord::new(0, 0), HexCoord::new(1, 0), HexCoord::new(1, 1)]);
    }

    #[test]
    fn test_pass_limit_leaves_far_tiles_unreachable() {
        let map = build(MapDefinition::open("Open", 10, 1));
        let mut field = CostField::for_map(&map);
        field.populate(&map, HexCoord::new(0, 0), 3);

        assert_eq!(field.cost_at(HexCoord::new(3, 0)), 3);
        assert_eq!(field.cost_at(HexCoord::new(4, 0)), UNREACHABLE_COST);
    }

    #[test]
    fn test_long_corridor_is_not_truncated() {
        let map = build(MapDefinition::open("Corridor", 1200, 1));
        let mut field = CostField::for_map(&map);
        let limit = crate::core::config::MatchConfig::default().flood_pass_limit(map.tile_count());
        field.populate(&map, HexCoord::new(0, 0), limit);

        assert_eq!(field.unreachable_cost(), 1200);
        assert_eq!(field.cost_at(HexCoord::new(998, 0)), 998);
        assert_eq!(field.cost_at(HexCoord::new(999, 0)), 999);
        assert_eq!(field.cost_at(HexCoord::new(1100, 0)), 1100);
        assert_eq!(field.cost_at(HexCoord::new(1199, 0)), 1199);
        assert!(field.is_reachable(HexCoord::new(1199, 0)));
        assert_eq!(field.path_to(&map, HexCoord::new(1100, 0)).map(|p| p.len()), Some(1101));
    }

    #[test]
    fn test_small_grid_keeps_default_sentinel() {
        let map = build(MapDefinition::open("Open", 10, 10));
        assert_eq!(CostField::for_map(&map).unreachable_cost(), UNREACHABLE_COST);
    }

    #[test]
    fn test_reachable_within_and_band() {
        let map = build(MapDefinition::open("Open", 12, 12));
        let mut field = CostField::for_map(&map);
        field.populate(&map, HexCoord::new(6, 6), 999);

        assert_eq!(field.reachable_within(0), vec![HexCoord::new(6, 6)]);
        assert_eq!(field.reachable_within(1).len(), 7);
        assert_eq!(field.within_band(1, 2).len(), 18);
    }

    #[test]
    fn test_off_grid_source_clears_field() {
        let map = build(MapDefinition::open("Open", 3, 3));
        let mut field = CostField::for_map(&map);
        field.populate(&map, HexCoord::new(1, 1), 999);
        field.populate(&map, HexCoord::INVALID, 999);

        assert_eq!(field.source(), None);
        assert!(field.reachable_within(UNREACHABLE_COST - 1).is_empty());
    }
}
