//! Hex coordinate system for battle maps (offset column/row coordinates)
//!
//! Each column step shifts a tile right by `COLUMN_SPACING` and up by half a
//! row, so the grid tiles flat-top hexes without gaps.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::constants::{COLUMN_SPACING, COLUMN_Y_SHIFT, HEX_CIRCUMRADIUS, ROW_SPACING};

/// Column/row hex coordinate for battle map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub col: i32,
    pub row: i32,
}

impl HexCoord {
    /// "No selection" sentinel
    pub const INVALID: HexCoord = HexCoord { col: -1, row: -1 };

    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn is_invalid(&self) -> bool {
        *self == Self::INVALID
    }

    /// World-space centre of this hex (z = 0 plane)
    pub fn center_position(&self) -> Vec2 {
        let col = self.col as f32;
        let row = self.row as f32;
        Vec2::new(COLUMN_SPACING * col, COLUMN_Y_SHIFT * col + ROW_SPACING * row)
    }

    /// Hex distance in steps
    pub fn taxicab_distance(&self, other: &Self) -> u32 {
        let d_col = self.col - other.col;
        let d_row = self.row - other.row;
        ((d_col.abs() + (d_col + d_row).abs() + d_row.abs()) / 2) as u32
    }

    /// Neighbor in the given direction
    pub fn neighbor(&self, direction: HexDirection) -> Self {
        let offset = direction.offset();
        Self::new(self.col + offset.col, self.row + offset.row)
    }

    /// All 6 neighbors, in `HexDirection::ALL` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|direction| self.neighbor(direction))
    }

    /// The six corners of this hex, counter-clockwise from the east corner
    pub fn vertices(&self) -> [Vec2; 6] {
        let center = self.center_position();
        std::array::from_fn(|index| {
            let radians = (index as f32 * 60.0).to_radians();
            center + Vec2::new(radians.cos(), radians.sin()) * HEX_CIRCUMRADIUS
        })
    }

    /// Does `point` lie inside (or on the edge of) this hex?
    ///
    /// Convex polygon test: the point must be on the left of every
    /// counter-clockwise edge.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let vertices = self.vertices();
        (0..6).all(|index| {
            let start = vertices[index];
            let end = vertices[(index + 1) % 6];
            let edge = (end - start).extend(0.0);
            let to_point = (point - start).extend(0.0);
            edge.cross(to_point).z >= 0.0
        })
    }
}

impl Default for HexCoord {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Hex-grid distance between two coordinates
pub fn taxicab_distance(a: HexCoord, b: HexCoord) -> u32 {
    a.taxicab_distance(&b)
}

/// World-space centre of a hex as a 3-D point on the ground plane
pub fn center_position_3d(coord: HexCoord) -> Vec3 {
    coord.center_position().extend(0.0)
}

/// Neighbor directions
///
/// The order of `ALL` is the fixed check order for flood fill and path
/// reconstruction; ties are broken by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl HexDirection {
    pub const ALL: [HexDirection; 6] = [
        HexDirection::North,
        HexDirection::NorthEast,
        HexDirection::SouthEast,
        HexDirection::South,
        HexDirection::SouthWest,
        HexDirection::NorthWest,
    ];

    /// Get the coordinate offset for this direction
    pub fn offset(&self) -> HexCoord {
        match self {
            HexDirection::North => HexCoord::new(0, 1),
            HexDirection::NorthEast => HexCoord::new(1, 0),
            HexDirection::SouthEast => HexCoord::new(1, -1),
            HexDirection::South => HexCoord::new(0, -1),
            HexDirection::SouthWest => HexCoord::new(-1, 0),
            HexDirection::NorthWest => HexCoord::new(-1, 1),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::North => HexDirection::South,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::SouthEast => HexDirection::NorthWest,
            HexDirection::South => HexDirection::North,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::NorthWest => HexDirection::SouthEast,
        }
    }
}
