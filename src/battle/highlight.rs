//! Per-frame view of the battle for whatever draws it

use serde::{Deserialize, Serialize};

use crate::battle::execution::{Battle, MatchOutcome};
use crate::battle::hex::HexCoord;
use crate::battle::turn::PlayerActionState;
use crate::battle::units::Unit;
use crate::core::types::Player;

/// Stats shown for the selected or hovered unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub name: String,
    pub owner: Player,
    pub attack: i32,
    pub defense: i32,
    pub range_min: u32,
    pub range_max: u32,
    pub movement: u32,
    pub health: i32,
    pub max_health: i32,
}

/// Tile sets and status for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub current_player: Player,
    pub action_state: PlayerActionState,
    pub selected_tile: HexCoord,
    pub selected_unit_tile: HexCoord,
    pub reachable_tiles: Vec<HexCoord>,
    pub path_tiles: Vec<HexCoord>,
    pub attackable_tiles: Vec<HexCoord>,
    pub targeted_tile: HexCoord,
    pub stat_block: Option<StatBlock>,
    pub outcome: Option<MatchOutcome>,
    pub paused: bool,
}

impl FrameView {
    /// Derive the view from the battle; the cost field must already be fresh
    pub fn build(battle: &Battle, hovered: HexCoord, outcome: Option<MatchOutcome>, paused: bool) -> Self {
        let state = battle.action_state();
        let selected = battle.selected_unit();

        let mut view = Self {
            current_player: battle.current_player(),
            action_state: state,
            selected_tile: battle.turn.selected_tile,
            selected_unit_tile: selected.map_or(HexCoord::INVALID, |u| u.coord),
            reachable_tiles: Vec::new(),
            path_tiles: Vec::new(),
            attackable_tiles: Vec::new(),
            targeted_tile: battle.targeted_unit().map_or(HexCoord::INVALID, |u| u.coord),
            stat_block: None,
            outcome,
            paused,
        };

        let hovered_unit = battle.map.unit_at(hovered, None);
        view.stat_block = selected.or(hovered_unit).map(|unit| stat_block(battle, unit));

        let Some(unit) = selected else {
            return view;
        };
        let kind = battle.map.unit_kind(unit);
        let field = &battle.field;

        if matches!(state, PlayerActionState::UnitSelected | PlayerActionState::UnitMoved) {
            view.reachable_tiles = field
                .reachable_within(kind.movement_range)
                .into_iter()
                .filter(|coord| battle.map.is_selectable(*coord))
                .collect();
        }

        let path_end = match state {
            PlayerActionState::UnitSelected if field.cost_at(hovered) <= kind.movement_range => Some(hovered),
            PlayerActionState::UnitMoved => Some(unit.coord),
            _ => None,
        };
        if let Some(end) = path_end {
            view.path_tiles = field.path_to(&battle.map, end).unwrap_or_default();
        }

        let band_max = match state {
            PlayerActionState::UnitSelected | PlayerActionState::UnitMoved => Some(kind.threat_range()),
            PlayerActionState::UnitMoveConfirmed => Some(kind.attack_range_max),
            _ => None,
        };
        if let Some(max) = band_max {
            view.attackable_tiles = battle
                .map
                .roster(unit.owner.opponent())
                .iter()
                .map(|enemy| enemy.coord)
                .filter(|coord| {
                    let cost = field.cost_at(*coord);
                    battle.map.is_selectable(*coord) && cost >= kind.attack_range_min && cost <= max
                })
                .collect();
        }

        view
    }
}

fn stat_block(battle: &Battle, unit: &Unit) -> StatBlock {
    let kind = battle.map.unit_kind(unit);
    StatBlock {
        name: kind.name.clone(),
        owner: unit.owner,
        attack: kind.attack_damage,
        defense: kind.defense,
        range_min: kind.attack_range_min,
        range_max: kind.attack_range_max,
        movement: kind.movement_range,
        health: unit.health,
        max_health: kind.health,
    }
}
