//! Cursor picking: camera ray onto the ground plane, then onto a tile

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::battle::battle_map::BattleMap;
use crate::battle::hex::HexCoord;

/// A ray from the camera through the cursor, in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl CursorRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray looking straight down at a ground point from `height`
    pub fn straight_down(point: Vec2, height: f32) -> Self {
        Self::new(point.extend(height), Vec3::NEG_Z)
    }
}

/// Where the ray meets the z = 0 plane, if it reaches it at all
pub fn ground_point(ray: &CursorRay) -> Option<Vec2> {
    if ray.direction.z == 0.0 {
        return None;
    }
    let t = -ray.origin.z / ray.direction.z;
    if t < 0.0 {
        return None;
    }
    Some((ray.origin + ray.direction * t).truncate())
}

/// The selectable tile under the cursor
pub fn pick_tile(map: &BattleMap, ray: &CursorRay) -> Option<HexCoord> {
    ground_point(ray).and_then(|point| map.tile_at_point(point))
}
