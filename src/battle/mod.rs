//! Battle system - hex grid, units, turn state and combat
//!
//! Everything in here is deterministic: two peers that start from the same
//! definitions and apply the same commands end up with identical state.
//!
//! Layers, leaf first:
//! - Hex addressing and the flood-fill cost field
//! - The map registry (tiles plus per-player rosters)
//! - Turn state and combat resolution
//! - The per-frame view handed to rendering

pub mod battle_map;
pub mod constants;
pub mod cost_field;
pub mod definitions;
pub mod execution;
pub mod hex;
pub mod highlight;
pub mod picking;
pub mod resolution;
pub mod terrain;
pub mod turn;
pub mod unit_type;
pub mod units;

// Re-exports for convenient access
pub use battle_map::{BattleMap, MapSnapshot, Tile};
pub use constants::*;
pub use cost_field::CostField;
pub use definitions::{parse_layout, Definitions, MapDefinition, NO_UNIT_SYMBOL};
pub use execution::{Battle, BattleSnapshot, EndReason, MatchOutcome};
pub use hex::{center_position_3d, taxicab_distance, HexCoord, HexDirection};
pub use highlight::{FrameView, StatBlock};
pub use picking::{ground_point, pick_tile, CursorRay};
pub use resolution::{calculate_damage, resolve_attack, AttackReport};
pub use terrain::TileKind;
pub use turn::{PlayerActionState, TurnState};
pub use unit_type::{Archetype, UnitKind};
pub use units::{Roster, Unit};
