//! Unit kinds and their combat archetypes
//!
//! Kinds are immutable once loaded; live units point at them by id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Combat archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// May move and then attack in the same turn
    Tank,
    /// Either moves or attacks in a turn, never both
    Artillery,
}

impl Archetype {
    /// Can a unit of this archetype still attack after confirming a move?
    pub fn can_attack_after_move(&self) -> bool {
        match self {
            Archetype::Tank => true,
            Archetype::Artillery => false,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archetype::Tank => write!(f, "Tank"),
            Archetype::Artillery => write!(f, "Artillery"),
        }
    }
}

/// Load-time definition of a kind of unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitKind {
    pub name: String,
    /// Single character used in map unit layouts
    pub symbol: char,
    pub archetype: Archetype,
    pub attack_damage: i32,
    pub attack_range_min: u32,
    pub attack_range_max: u32,
    pub movement_range: u32,
    pub defense: i32,
    /// Maximum (and starting) health
    pub health: i32,
    /// Renderable model reference, opaque to the simulation
    #[serde(default)]
    pub model: String,
}

impl UnitKind {
    /// Is a target `distance` hexes away inside the attack band?
    pub fn in_attack_range(&self, distance: u32) -> bool {
        distance >= self.attack_range_min && distance <= self.attack_range_max
    }

    /// Farthest hex this unit could threaten this turn before moving
    pub fn threat_range(&self) -> u32 {
        if self.archetype.can_attack_after_move() {
            self.movement_range.saturating_add(self.attack_range_max)
        } else {
            self.attack_range_max
        }
    }

    /// Check stat consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.defense <= 0 {
            return Err(format!("unit '{}' must have positive defense", self.name));
        }
        if self.health <= 0 {
            return Err(format!("unit '{}' must have positive health", self.name));
        }
        if self.attack_damage < 0 {
            return Err(format!("unit '{}' has negative attack damage", self.name));
        }
        if self.attack_range_min > self.attack_range_max {
            return Err(format!(
                "unit '{}' attack range min ({}) exceeds max ({})",
                self.name, self.attack_range_min, self.attack_range_max
            ));
        }
        Ok(())
    }
}
