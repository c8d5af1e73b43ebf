//! Live units and per-player rosters
//!
//! A roster keeps units in insertion order, which is also the order used when
//! cycling through units. Removal keeps the order of the survivors.

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::core::types::{Player, UnitId, UnitKindId};

/// One live combat unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKindId,
    pub coord: HexCoord,
    pub health: i32,
    pub owner: Player,
    /// Set once the unit has acted this turn
    pub moved: bool,
}

impl Unit {
    pub fn new(id: UnitId, kind: UnitKindId, coord: HexCoord, health: i32, owner: Player) -> Self {
        Self {
            id,
            kind,
            coord,
            health,
            owner,
            moved: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Can this unit still be selected this turn?
    pub fn is_ready(&self) -> bool {
        !self.moved
    }
}

/// Every unit one player owns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    units: Vec<Unit>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn at(&self, coord: HexCoord) -> Option<&Unit> {
        self.units.iter().find(|u| u.coord == coord)
    }

    /// Drop every unit whose health has reached zero, returning their ids
    pub fn remove_dead(&mut self) -> Vec<UnitId> {
        let dead: Vec<UnitId> = self.units.iter().filter(|u| !u.is_alive()).map(|u| u.id).collect();
        self.units.retain(Unit::is_alive);
        dead
    }

    /// Start of a fresh turn for this roster's owner
    pub fn clear_moved(&mut self) {
        for unit in &mut self.units {
            unit.moved = false;
        }
    }

    pub fn first_ready(&self) -> Option<UnitId> {
        self.units.iter().find(|u| u.is_ready()).map(|u| u.id)
    }

    pub fn last_ready(&self) -> Option<UnitId> {
        self.units.iter().rev().find(|u| u.is_ready()).map(|u| u.id)
    }

    /// Next ready unit after `current`, wrapping around; never `current` itself
    pub fn next_ready_after(&self, current: UnitId) -> Option<UnitId> {
        let start = self.units.iter().position(|u| u.id == current)?;
        let count = self.units.len();
        (1..count)
            .map(|step| &self.units[(start + step) % count])
            .find(|u| u.is_ready())
            .map(|u| u.id)
    }

    /// Previous ready unit before `current`, wrapping around; never `current` itself
    pub fn prev_ready_before(&self, current: UnitId) -> Option<UnitId> {
        let start = self.units.iter().position(|u| u.id == current)?;
        let count = self.units.len();
        (1..count)
            .map(|step| &self.units[(start + count - step) % count])
            .find(|u| u.is_ready())
            .map(|u| u.id)
    }
}
