//! Battle map: tile grid plus the two player rosters
//!
//! Tiles never change once the map is built; only units move, take damage,
//! and die.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::battle::definitions::Definitions;
use crate::battle::hex::HexCoord;
use crate::battle::terrain::TileKind;
use crate::battle::unit_type::UnitKind;
use crate::battle::units::{Roster, Unit};
use crate::core::error::Result;
use crate::core::types::{Player, TileKindId, UnitId};

/// A single hex on the battle map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub kind: TileKindId,
}

/// Serializable view of everything that can change during a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub map: String,
    pub rosters: [Roster; 2],
}

/// The battle map
#[derive(Debug, Clone)]
pub struct BattleMap {
    defs: Arc<Definitions>,
    name: String,
    width: u32,
    height: u32,
    bounds_min: Vec2,
    bounds_max: Vec2,
    tiles: Vec<Tile>,
    rosters: [Roster; 2],
}

impl BattleMap {
    /// Build the named map from the definitions bundle
    pub fn new(defs: Arc<Definitions>, map_name: &str) -> Result<Self> {
        let def = defs.map(map_name)?;
        let (width, height) = (def.width, def.height);

        let mut tiles = Vec::with_capacity(def.tile_count());
        for (index, symbol) in def.tiles.iter().enumerate() {
            tiles.push(Tile {
                coord: coord_of(index, width),
                kind: defs.resolve_tile_symbol(*symbol)?,
            });
        }

        let mut rosters = [Roster::new(), Roster::new()];
        let mut next_id = 0u32;
        for player in Player::ALL {
            for (index, symbol) in def.player_units[player.index()].iter().enumerate() {
                // Symbols that name no unit kind are empty cells
                let Some(kind_id) = defs.unit_kind_by_symbol(*symbol) else {
                    continue;
                };
                let kind = defs.unit_kind(kind_id);
                rosters[player.index()].push(Unit::new(
                    UnitId(next_id),
                    kind_id,
                    coord_of(index, width),
                    kind.health,
                    player,
                ));
                next_id += 1;
            }
        }

        tracing::info!(
            "Built map '{}' ({}x{}) with {} vs {} units",
            def.name,
            width,
            height,
            rosters[0].len(),
            rosters[1].len()
        );

        Ok(Self {
            name: def.name.clone(),
            width,
            height,
            bounds_min: def.bounds_min,
            bounds_max: def.bounds_max,
            tiles,
            rosters,
            defs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Is the coordinate inside the tile grid?
    pub fn in_grid(&self, coord: HexCoord) -> bool {
        coord.col >= 0
            && coord.row >= 0
            && coord.col < self.width as i32
            && coord.row < self.height as i32
    }

    /// Row-major tile index (`row * width + col`)
    pub fn tile_index(&self, coord: HexCoord) -> Option<usize> {
        self.in_grid(coord)
            .then(|| coord.row as usize * self.width as usize + coord.col as usize)
    }

    /// Tile for a possibly untrusted index
    pub fn tile_at_index(&self, index: i32) -> Option<&Tile> {
        usize::try_from(index).ok().and_then(|i| self.tiles.get(i))
    }

    pub fn tile(&self, coord: HexCoord) -> Option<&Tile> {
        self.tile_index(coord).map(|i| &self.tiles[i])
    }

    pub fn tile_kind(&self, tile: &Tile) -> &TileKind {
        self.defs.tile_kind(tile.kind)
    }

    /// Can a unit stand on this tile, and can the cursor pick it?
    ///
    /// The tile centre must lie strictly inside the world bounds and the
    /// tile kind must not be blocked.
    pub fn is_selectable(&self, coord: HexCoord) -> bool {
        let Some(tile) = self.tile(coord) else {
            return false;
        };
        let center = coord.center_position();
        let inside = center.x > self.bounds_min.x
            && center.y > self.bounds_min.y
            && center.x < self.bounds_max.x
            && center.y < self.bounds_max.y;
        inside && self.tile_kind(tile).is_passable()
    }

    /// First selectable tile whose hex contains the world-space point
    pub fn tile_at_point(&self, point: Vec2) -> Option<HexCoord> {
        self.tiles
            .iter()
            .map(|tile| tile.coord)
            .find(|coord| self.is_selectable(*coord) && coord.contains_point(point))
    }

    pub fn roster(&self, player: Player) -> &Roster {
        &self.rosters[player.index()]
    }

    pub fn roster_mut(&mut self, player: Player) -> &mut Roster {
        &mut self.rosters[player.index()]
    }

    /// Unit standing on `coord`, optionally restricted to one owner
    pub fn unit_at(&self, coord: HexCoord, owner: Option<Player>) -> Option<&Unit> {
        match owner {
            Some(player) => self.roster(player).at(coord),
            None => Player::ALL.iter().find_map(|p| self.roster(*p).at(coord)),
        }
    }

    /// Resolve a unit handle; `None` once the unit has died
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.rosters.iter().find_map(|roster| roster.get(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.rosters.iter_mut().find_map(|roster| roster.get_mut(id))
    }

    pub fn unit_kind(&self, unit: &Unit) -> &UnitKind {
        self.defs.unit_kind(unit.kind)
    }

    /// Remove every unit at or below zero health from both rosters
    pub fn remove_dead(&mut self) -> Vec<UnitId> {
        let mut dead = Vec::new();
        for roster in &mut self.rosters {
            dead.extend(roster.remove_dead());
        }
        dead
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            map: self.name.clone(),
            rosters: self.rosters.clone(),
        }
    }
}

fn coord_of(index: usize, width: u32) -> HexCoord {
    let width = width as usize;
    HexCoord::new((index % width) as i32, (index / width) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::definitions::MapDefinition;
    use crate::battle::unit_type::Archetype;

    fn defs() -> Arc<Definitions> {
        let tiles = vec![
            TileKind::new("Grass", '.', false),
            TileKind::new("Blocked", '#', true),
        ];
        let units = vec![UnitKind {
            name: "Tank".into(),
            symbol: 't',
            archetype: Archetype::Tank,
            attack_damage: 4,
            attack_range_min: 1,
            attack_range_max: 2,
            movement_range: 4,
            defense: 2,
            health: 10,
            model: String::new(),
        }];
        let map = MapDefinition::open("Test", 5, 4)
            .with_tile(HexCoord::new(2, 2), '#')
            .with_unit(Player::One, HexCoord::new(0, 0), 't')
            .with_unit(Player::One, HexCoord::new(3, 0), 't')
            .with_unit(Player::Two, HexCoord::new(4, 3), 't');
        Arc::new(Definitions::new(tiles, units, vec![map]).unwrap())
    }

    #[test]
    fn test_build_places_units_with_full_health() {
        let map = BattleMap::new(defs(), "Test").unwrap();
        assert_eq!(map.tile_count(), 20);
        assert_eq!(map.roster(Player::One).len(), 2);
        assert_eq!(map.roster(Player::Two).len(), 1);

        let unit = map.unit_at(HexCoord::new(4, 3), None).unwrap();
        assert_eq!(unit.owner, Player::Two);
        assert_eq!(unit.health, 10);
    }

    #[test]
    fn test_tile_index_is_row_major() {
        let map = BattleMap::new(defs(), "Test").unwrap();
        assert_eq!(map.tile_index(HexCoord::new(3, 2)), Some(13));
        assert_eq!(map.tile_index(HexCoord::new(5, 0)), None);
        assert_eq!(map.tile_index(HexCoord::INVALID), None);
        assert_eq!(map.tile_at_index(13).unwrap().coord, HexCoord::new(3, 2));
        assert!(map.tile_at_index(-1).is_none());
        assert!(map.tile_at_index(20).is_none());
    }

    #[test]
    fn test_blocked_tile_not_selectable() {
        let map = BattleMap::new(defs(), "Test").unwrap();
        assert!(!map.is_selectable(HexCoord::new(2, 2)));
        assert!(map.is_selectable(HexCoord::new(1, 1)));
    }

    #[test]
    fn test_tile_outside_bounds_not_selectable() {
        let defs = defs();
        let narrowed = MapDefinition::open("Narrow", 5, 4)
            .with_bounds(Vec2::new(-1.0, -1.0), Vec2::new(2.0, 10.0));
        let defs = Arc::new(
            Definitions::new(
                vec![defs.tile_kind(TileKindId(0)).clone(), defs.tile_kind(TileKindId(1)).clone()],
                Vec::new(),
                vec![narrowed],
            )
            .unwrap(),
        );
        let map = BattleMap::new(defs, "Narrow").unwrap();
        assert!(map.is_selectable(HexCoord::new(2, 0)));
        assert!(!map.is_selectable(HexCoord::new(3, 0)));
    }

    #[test]
    fn test_tile_at_point() {
        let map = BattleMap::new(defs(), "Test").unwrap();
        let coord = HexCoord::new(3, 1);
        assert_eq!(map.tile_at_point(coord.center_position()), Some(coord));
        assert_eq!(map.tile_at_point(HexCoord::new(2, 2).center_position()), None);
        assert_eq!(map.tile_at_point(Vec2::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_unit_handle_stops_resolving_after_death() {
        let mut map = BattleMap::new(defs(), "Test").unwrap();
        let id = map.unit_at(HexCoord::new(4, 3), None).unwrap().id;
        map.unit_mut(id).unwrap().health = 0;

        assert_eq!(map.remove_dead(), vec![id]);
        assert!(map.unit(id).is_none());
        assert!(map.roster(Player::Two).is_empty());
    }

    #[test]
    fn test_unit_at_filters_by_owner() {
        let map = BattleMap::new(defs(), "Test").unwrap();
        let coord = HexCoord::new(0, 0);
        assert!(map.unit_at(coord, Some(Player::One)).is_some());
        assert!(map.unit_at(coord, Some(Player::Two)).is_none());
    }
}
