//! Tile kinds and their effects
//!
//! A tile kind is either passable or blocked; nothing else about terrain
//! affects movement.

use serde::{Deserialize, Serialize};

/// Load-time definition of a kind of tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileKind {
    pub name: String,
    /// Single character used in map layouts
    pub symbol: char,
    #[serde(default)]
    pub blocked: bool,
}

impl TileKind {
    pub fn new(name: impl Into<String>, symbol: char, blocked: bool) -> Self {
        Self {
            name: name.into(),
            symbol,
            blocked,
        }
    }

    /// Can units stand on (and path through) this kind of tile?
    pub fn is_passable(&self) -> bool {
        !self.blocked
    }
}
