//! Battle constants - hex layout and flood-fill tuning in one place

// Hex layout (world units)
pub const COLUMN_SPACING: f32 = 0.866; // x shift per column step (sqrt(3)/2)
pub const COLUMN_Y_SHIFT: f32 = 0.5; // y shift per column step
pub const ROW_SPACING: f32 = 1.0; // y shift per row step
pub const HEX_CIRCUMRADIUS: f32 = 0.57735;

// Flood fill
pub const UNREACHABLE_COST: u32 = 999;
pub const DEFAULT_FLOOD_PASSES: u32 = 999;

// Combat
pub const DAMAGE_MULTIPLIER: i32 = 2;

// Largest grid a map may declare (width * height)
pub const MAX_GRID_TILES: u32 = 1 << 22;

// Tile kind every unknown map symbol resolves to
pub const BLOCKED_TILE_NAME: &str = "Blocked";
