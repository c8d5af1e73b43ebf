//! Match configuration with documented constants
//!
//! Everything here must be identical on both peers of a networked match,
//! except `seat`, which says which player this machine controls.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::battle::constants::DEFAULT_FLOOD_PASSES;
use crate::core::error::{Result, TacticsError};
use crate::core::types::Player;

/// Which players this machine issues commands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Seat {
    /// Single machine, both players share the input devices
    #[default]
    Hotseat,
    /// One player per machine (server is player One, client is player Two)
    Networked { player: Player },
}

impl Seat {
    /// Does this machine issue commands for `player`?
    pub fn controls(&self, player: Player) -> bool {
        match self {
            Seat::Hotseat => true,
            Seat::Networked { player: local } => *local == player,
        }
    }

    /// The locally controlled player, if there is exactly one
    pub fn local_player(&self) -> Option<Player> {
        match self {
            Seat::Hotseat => None,
            Seat::Networked { player } => Some(*player),
        }
    }
}

/// How a defender's counter-attack damage is computed
///
/// The shipped game divides the defender's attack by the defender's own
/// defense. That reads like a slip relative to the primary formula, but it is
/// the observed behaviour, so it stays the default until designers decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetaliationRule {
    /// `2 * defender.attack / defender.defense` (observed behaviour)
    #[default]
    DefenderDefense,
    /// `2 * defender.attack / attacker.defense` (mirrors the primary attack)
    AttackerDefense,
}

/// Configuration for one match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Which player(s) this machine controls
    pub seat: Seat,

    /// Map loaded when the match starts
    pub default_map: String,

    /// Directory holding `tiles.toml`, `units.toml` and `maps.toml`
    pub data_dir: PathBuf,

    /// Counter-attack damage formula
    pub retaliation: RetaliationRule,

    /// Upper bound on flood-fill passes
    ///
    /// The effective bound is raised to the map's tile count, since no
    /// shortest path can be longer than that.
    pub max_flood_passes: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seat: Seat::Hotseat,
            default_map: "Grid12x12".to_string(),
            data_dir: PathBuf::from("data"),
            retaliation: RetaliationRule::DefenderDefense,
            max_flood_passes: DEFAULT_FLOOD_PASSES,
        }
    }
}

impl MatchConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MatchConfig = toml::from_str(content)?;
        config.validate().map_err(TacticsError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.default_map.trim().is_empty() {
            return Err("default_map must name a map".into());
        }

        if self.max_flood_passes == 0 {
            return Err("max_flood_passes must be positive".into());
        }

        Ok(())
    }

    /// Flood-fill pass bound for a map with `tile_count` tiles
    pub fn flood_pass_limit(&self, tile_count: usize) -> u32 {
        let tiles = u32::try_from(tile_count).unwrap_or(u32::MAX);
        self.max_flood_passes.max(tiles)
    }
}
