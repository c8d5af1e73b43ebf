//! Load tile, unit, and map definitions from TOML files
//!
//! Definitions are read once before a match starts and shared immutably
//! (behind an `Arc`) by every map built from them.

use ahash::AHashMap;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::battle::constants::{
    BLOCKED_TILE_NAME, COLUMN_SPACING, COLUMN_Y_SHIFT, MAX_GRID_TILES, ROW_SPACING,
};
use crate::battle::hex::HexCoord;
use crate::battle::terrain::TileKind;
use crate::battle::unit_type::UnitKind;
use crate::core::error::{Result, TacticsError};
use crate::core::types::{Player, TileKindId, UnitKindId};

/// Symbol that never names a unit kind; marks an empty cell in unit layouts
pub const NO_UNIT_SYMBOL: char = '.';

/// Layout and bounds of one playable map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDefinition {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub bounds_min: Vec2,
    pub bounds_max: Vec2,
    /// Tile symbols, row-major with row 0 first
    pub tiles: Vec<char>,
    /// Starting unit symbols per player, same indexing as `tiles`
    pub player_units: [Vec<char>; 2],
}

impl MapDefinition {
    /// An all-`.` map of the given size, with no units and bounds that
    /// enclose every tile
    ///
    /// Oversized grids come out empty and fail validation.
    pub fn open(name: impl Into<String>, width: u32, height: u32) -> Self {
        let count = cell_count(width, height).unwrap_or(0);
        let (bounds_min, bounds_max) = enclosing_bounds(width, height);
        Self {
            name: name.into(),
            width,
            height,
            bounds_min,
            bounds_max,
            tiles: vec!['.'; count],
            player_units: [vec![NO_UNIT_SYMBOL; count], vec![NO_UNIT_SYMBOL; count]],
        }
    }

    /// Replace the tile symbol at `coord` (ignored when out of the grid)
    pub fn with_tile(mut self, coord: HexCoord, symbol: char) -> Self {
        if let Some(index) = self.index_of(coord) {
            self.tiles[index] = symbol;
        }
        self
    }

    /// Place a starting unit for `player` at `coord` (ignored when out of the grid)
    pub fn with_unit(mut self, player: Player, coord: HexCoord, symbol: char) -> Self {
        if let Some(index) = self.index_of(coord) {
            self.player_units[player.index()][index] = symbol;
        }
        self
    }

    /// Override the world-space selectable bounds
    pub fn with_bounds(mut self, bounds_min: Vec2, bounds_max: Vec2) -> Self {
        self.bounds_min = bounds_min;
        self.bounds_max = bounds_max;
        self
    }

    pub fn tile_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    fn index_of(&self, coord: HexCoord) -> Option<usize> {
        let in_grid = coord.col >= 0
            && coord.row >= 0
            && coord.col < self.width as i32
            && coord.row < self.height as i32;
        in_grid.then(|| coord.row as usize * self.width as usize + coord.col as usize)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TacticsError::InvalidDefinition(format!(
                "map '{}' has an empty grid",
                self.name
            )));
        }
        if cell_count(self.width, self.height).is_none() {
            return Err(oversized(&self.name, self.width, self.height));
        }

        let expected = self.tile_count();
        let grids = [
            ("tiles", &self.tiles),
            ("player 1 units", &self.player_units[0]),
            ("player 2 units", &self.player_units[1]),
        ];
        for (label, grid) in grids {
            if grid.len() != expected {
                return Err(TacticsError::InvalidDefinition(format!(
                    "map '{}' {} grid has {} symbols, expected {}x{} = {}",
                    self.name,
                    label,
                    grid.len(),
                    self.width,
                    self.height,
                    expected
                )));
            }
        }
        Ok(())
    }
}

/// Cell count of a `width` x `height` grid; `None` past `MAX_GRID_TILES`
fn cell_count(width: u32, height: u32) -> Option<usize> {
    let count = width.checked_mul(height)?;
    (count <= MAX_GRID_TILES).then_some(count as usize)
}

fn oversized(name: &str, width: u32, height: u32) -> TacticsError {
    TacticsError::InvalidDefinition(format!(
        "map '{}' grid {}x{} exceeds {} tiles",
        name, width, height, MAX_GRID_TILES
    ))
}

fn enclosing_bounds(width: u32, height: u32) -> (Vec2, Vec2) {
    let max_col = width.saturating_sub(1) as f32;
    let max_row = height.saturating_sub(1) as f32;
    let bounds_min = Vec2::new(-1.0, -1.0);
    let bounds_max = Vec2::new(
        COLUMN_SPACING * max_col + 1.0,
        COLUMN_Y_SHIFT * max_col + ROW_SPACING * max_row + 1.0,
    );
    (bounds_min, bounds_max)
}

/// Split a layout block into symbols, row-major with row 0 first
///
/// The last non-empty text line is row 0, so layouts read the way they look
/// on screen. Each whitespace-separated token contributes its first char.
pub fn parse_layout(text: &str) -> Vec<char> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .rev()
        .flat_map(|line| line.split_whitespace().filter_map(|token| token.chars().next()))
        .collect()
}

// === TOML FILE FORMATS ===

#[derive(Debug, Deserialize)]
struct TileFile {
    #[serde(default)]
    tile: Vec<TileKind>,
}

#[derive(Debug, Deserialize)]
struct UnitFile {
    #[serde(default)]
    unit: Vec<UnitKind>,
}

#[derive(Debug, Deserialize)]
struct MapFile {
    #[serde(default)]
    map: Vec<MapEntry>,
}

#[derive(Debug, Deserialize)]
struct MapEntry {
    name: String,
    grid_size: [u32; 2],
    world_bounds_min: Option<[f32; 2]>,
    world_bounds_max: Option<[f32; 2]>,
    tiles: String,
    #[serde(default)]
    player1_units: String,
    #[serde(default)]
    player2_units: String,
}

impl MapEntry {
    fn into_definition(self) -> Result<MapDefinition> {
        let [width, height] = self.grid_size;
        let count = cell_count(width, height).ok_or_else(|| oversized(&self.name, width, height))?;
        let (default_min, default_max) = enclosing_bounds(width, height);

        // An omitted unit layout means the player starts with nothing
        let units = |text: &str| {
            if text.trim().is_empty() {
                vec![NO_UNIT_SYMBOL; count]
            } else {
                parse_layout(text)
            }
        };

        Ok(MapDefinition {
            name: self.name,
            width,
            height,
            bounds_min: self.world_bounds_min.map(Vec2::from).unwrap_or(default_min),
            bounds_max: self.world_bounds_max.map(Vec2::from).unwrap_or(default_max),
            tiles: parse_layout(&self.tiles),
            player_units: [units(&self.player1_units), units(&self.player2_units)],
        })
    }
}

/// Immutable bundle of everything loaded before a match
#[derive(Debug, Clone)]
pub struct Definitions {
    tiles: Vec<TileKind>,
    units: Vec<UnitKind>,
    maps: Vec<MapDefinition>,
    tile_symbols: AHashMap<char, TileKindId>,
    unit_symbols: AHashMap<char, UnitKindId>,
}

impl Definitions {
    /// Build and validate a bundle
    pub fn new(tiles: Vec<TileKind>, units: Vec<UnitKind>, maps: Vec<MapDefinition>) -> Result<Self> {
        let mut tile_symbols = AHashMap::new();
        for (index, tile) in tiles.iter().enumerate() {
            let id = TileKindId(u16::try_from(index).map_err(|_| {
                TacticsError::InvalidDefinition("too many tile kinds".into())
            })?);
            if tile_symbols.insert(tile.symbol, id).is_some() {
                return Err(TacticsError::InvalidDefinition(format!(
                    "tile symbol '{}' defined twice",
                    tile.symbol
                )));
            }
        }

        let mut unit_symbols = AHashMap::new();
        for (index, unit) in units.iter().enumerate() {
            unit.validate().map_err(TacticsError::InvalidDefinition)?;
            if unit.symbol == NO_UNIT_SYMBOL {
                return Err(TacticsError::InvalidDefinition(format!(
                    "unit '{}' uses the reserved empty symbol '{}'",
                    unit.name, NO_UNIT_SYMBOL
                )));
            }
            let id = UnitKindId(u16::try_from(index).map_err(|_| {
                TacticsError::InvalidDefinition("too many unit kinds".into())
            })?);
            if unit_symbols.insert(unit.symbol, id).is_some() {
                return Err(TacticsError::InvalidDefinition(format!(
                    "unit symbol '{}' defined twice",
                    unit.symbol
                )));
            }
        }

        for map in &maps {
            map.validate()?;
        }

        tracing::info!(
            "Loaded {} tile kinds, {} unit kinds, {} maps",
            tiles.len(),
            units.len(),
            maps.len()
        );

        Ok(Self {
            tiles,
            units,
            maps,
            tile_symbols,
            unit_symbols,
        })
    }

    /// Parse the three definition files from already-read TOML text
    pub fn from_toml_strs(tiles: &str, units: &str, maps: &str) -> Result<Self> {
        let tile_file: TileFile = toml::from_str(tiles)?;
        let unit_file: UnitFile = toml::from_str(units)?;
        let map_file: MapFile = toml::from_str(maps)?;

        let maps = map_file
            .map
            .into_iter()
            .map(MapEntry::into_definition)
            .collect::<Result<Vec<_>>>()?;

        Self::new(tile_file.tile, unit_file.unit, maps)
    }

    /// Load `tiles.toml`, `units.toml` and `maps.toml` from a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<String> {
            let path = dir.join(file);
            fs::read_to_string(&path).map_err(|e| {
                TacticsError::DefinitionNotFound(format!("{}: {}", path.display(), e))
            })
        };

        Self::from_toml_strs(&read("tiles.toml")?, &read("units.toml")?, &read("maps.toml")?)
    }

    pub fn tile_kind(&self, id: TileKindId) -> &TileKind {
        &self.tiles[id.0 as usize]
    }

    pub fn unit_kind(&self, id: UnitKindId) -> &UnitKind {
        &self.units[id.0 as usize]
    }

    pub fn tile_kind_by_symbol(&self, symbol: char) -> Option<TileKindId> {
        self.tile_symbols.get(&symbol).copied()
    }

    pub fn tile_kind_by_name(&self, name: &str) -> Option<TileKindId> {
        self.tiles
            .iter()
            .position(|tile| tile.name == name)
            .map(|index| TileKindId(index as u16))
    }

    pub fn unit_kind_by_symbol(&self, symbol: char) -> Option<UnitKindId> {
        self.unit_symbols.get(&symbol).copied()
    }

    /// Look up a map by name
    pub fn map(&self, name: &str) -> Result<&MapDefinition> {
        self.maps
            .iter()
            .find(|map| map.name == name)
            .ok_or_else(|| TacticsError::DefinitionNotFound(format!("map '{}'", name)))
    }

    /// Tile kind for a layout symbol, falling back to the `Blocked` kind
    pub(crate) fn resolve_tile_symbol(&self, symbol: char) -> Result<TileKindId> {
        self.tile_kind_by_symbol(symbol)
            .or_else(|| self.tile_kind_by_name(BLOCKED_TILE_NAME))
            .ok_or_else(|| {
                TacticsError::InvalidDefinition(format!(
                    "tile symbol '{}' is unknown and no '{}' tile kind exists",
                    symbol, BLOCKED_TILE_NAME
                ))
            })
    }
}
