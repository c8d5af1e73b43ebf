//! Command execution - applies commands to the battle state machine
//!
//! Every handler checks its state precondition first; a command that does
//! not fit the current state changes nothing and reports `Ignored`.

use crate::battle::execution::Battle;
use crate::battle::resolution::resolve_attack;
use crate::battle::turn::PlayerActionState;
use crate::battle::hex::HexCoord;
use crate::command::protocol::Command;
use crate::core::types::UnitId;

/// Did the command change anything?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Ignored,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        *self == ApplyOutcome::Applied
    }
}

/// Applies commands to a battle
pub struct CommandExecutor;

impl CommandExecutor {
    /// Apply one command; the same call runs on both peers
    pub fn apply(battle: &mut Battle, command: Command) -> ApplyOutcome {
        battle.ensure_selection();
        battle.refresh_field();

        let state = battle.action_state();
        let outcome = match command {
            Command::StartTurn => start_turn(battle),
            Command::SelectHex { tile_index } => select_hex(battle, tile_index),
            Command::SelectUnit => select_unit_at_tile(battle),
            Command::SelectFirstUnit => select_first_or_last(battle, true),
            Command::SelectLastUnit => select_first_or_last(battle, false),
            Command::SelectNextUnit => cycle_unit(battle, true),
            Command::SelectPreviousUnit => cycle_unit(battle, false),
            Command::MoveUnit => move_unit(battle),
            Command::ConfirmMove => confirm_move(battle),
            Command::Attack => attack(battle),
            Command::ConfirmAttack => confirm_attack(battle),
            Command::CancelMove => cancel_move(battle),
            Command::EndTurn => end_turn(battle),
            Command::ConfirmEnd => confirm_end(battle),
            Command::CancelEnd => cancel_end(battle),
            // Handled by the session, never by the state machine
            Command::PlayerReady | Command::PlayerQuit => ApplyOutcome::Ignored,
        };

        if outcome.is_applied() {
            battle.refresh_field();
        }

        tracing::debug!(
            "{} {:?} in {} -> {}",
            command,
            outcome,
            state,
            battle.action_state()
        );
        outcome
    }
}

fn transition(battle: &mut Battle, from: PlayerActionState, to: PlayerActionState) -> ApplyOutcome {
    if battle.action_state() != from {
        return ApplyOutcome::Ignored;
    }
    battle.turn.action_state = to;
    ApplyOutcome::Applied
}

fn start_turn(battle: &mut Battle) -> ApplyOutcome {
    let outcome = transition(battle, PlayerActionState::Ready, PlayerActionState::Selecting);
    if outcome.is_applied() {
        battle.turn.clear_selection();
        tracing::info!("{} starts their turn", battle.current_player());
    }
    outcome
}

fn select_hex(battle: &mut Battle, tile_index: i32) -> ApplyOutcome {
    if tile_index == -1 {
        battle.turn.selected_tile = HexCoord::INVALID;
        return ApplyOutcome::Applied;
    }

    // Remote input is untrusted; out-of-range indices change nothing
    match battle.map.tile_at_index(tile_index) {
        Some(tile) => {
            battle.turn.selected_tile = tile.coord;
            ApplyOutcome::Applied
        }
        None => ApplyOutcome::Ignored,
    }
}

/// Make `id` the selected unit and remember where it stands
fn select(battle: &mut Battle, id: UnitId) -> ApplyOutcome {
    let Some(unit) = battle.map.unit(id) else {
        return ApplyOutcome::Ignored;
    };
    battle.turn.previous_unit_coord = unit.coord;
    battle.turn.selected_unit = Some(id);
    battle.turn.targeted_unit = None;
    battle.turn.action_state = PlayerActionState::UnitSelected;
    ApplyOutcome::Applied
}

fn select_unit_at_tile(battle: &mut Battle) -> ApplyOutcome {
    if !matches!(
        battle.action_state(),
        PlayerActionState::Selecting | PlayerActionState::UnitSelected
    ) {
        return ApplyOutcome::Ignored;
    }

    let player = battle.current_player();
    let candidate = battle
        .map
        .unit_at(battle.turn.selected_tile, Some(player))
        .filter(|unit| unit.is_ready())
        .map(|unit| unit.id);

    match candidate {
        Some(id) => select(battle, id),
        None => ApplyOutcome::Ignored,
    }
}

fn select_first_or_last(battle: &mut Battle, first: bool) -> ApplyOutcome {
    if battle.action_state() != PlayerActionState::Selecting {
        return ApplyOutcome::Ignored;
    }

    let roster = battle.map.roster(battle.current_player());
    let candidate = if first {
        roster.first_ready()
    } else {
        roster.last_ready()
    };

    match candidate {
        Some(id) => select(battle, id),
        None => ApplyOutcome::Ignored,
    }
}

fn cycle_unit(battle: &mut Battle, forward: bool) -> ApplyOutcome {
    if battle.action_state() != PlayerActionState::UnitSelected {
        return ApplyOutcome::Ignored;
    }
    let Some(current) = battle.turn.selected_unit else {
        return ApplyOutcome::Ignored;
    };

    let roster = battle.map.roster(battle.current_player());
    let candidate = if forward {
        roster.next_ready_after(current)
    } else {
        roster.prev_ready_before(current)
    };

    match candidate {
        Some(id) => select(battle, id),
        None => ApplyOutcome::Ignored,
    }
}

fn move_unit(battle: &mut Battle) -> ApplyOutcome {
    if battle.action_state() != PlayerActionState::UnitSelected {
        return ApplyOutcome::Ignored;
    }
    let Some(unit) = battle.selected_unit() else {
        return ApplyOutcome::Ignored;
    };

    let destination = battle.turn.selected_tile;
    let range = battle.map.unit_kind(unit).movement_range;
    let id = unit.id;

    let valid = battle.map.tile_index(destination).is_some()
        && battle.map.is_selectable(destination)
        && battle.map.unit_at(destination, None).is_none()
        && battle.field.cost_at(destination) <= range;
    if !valid {
        return ApplyOutcome::Ignored;
    }

    if let Some(unit) = battle.map.unit_mut(id) {
        unit.coord = destination;
    }
    battle.turn.action_state = PlayerActionState::UnitMoved;
    ApplyOutcome::Applied
}

fn confirm_move(battle: &mut Battle) -> ApplyOutcome {
    if battle.action_state() != PlayerActionState::UnitMoved {
        return ApplyOutcome::Ignored;
    }
    let Some(unit) = battle.selected_unit() else {
        return ApplyOutcome::Ignored;
    };
    if unit.coord != battle.turn.selected_tile {
        return ApplyOutcome::Ignored;
    }

    let id = unit.id;
    if battle.map.unit_kind(unit).archetype.can_attack_after_move() {
        battle.turn.action_state = PlayerActionState::UnitMoveConfirmed;
    } else {
        finish_unit(battle, id);
    }
    ApplyOutcome::Applied
}

fn attack(battle: &mut Battle) -> ApplyOutcome {
    let state = battle.action_state();
    if !matches!(
        state,
        PlayerActionState::UnitSelected | PlayerActionState::UnitMoveConfirmed
    ) {
        return ApplyOutcome::Ignored;
    }
    let Some(unit) = battle.selected_unit() else {
        return ApplyOutcome::Ignored;
    };
    let id = unit.id;
    let kind = battle.map.unit_kind(unit);

    let enemy = battle
        .map
        .unit_at(battle.turn.selected_tile, Some(unit.owner.opponent()));

    match enemy {
        Some(enemy) => {
            if !kind.in_attack_range(battle.field.cost_at(enemy.coord)) {
                return ApplyOutcome::Ignored;
            }
            battle.turn.targeted_unit = Some(enemy.id);
            battle.turn.action_state = PlayerActionState::UnitAttacking;
            ApplyOutcome::Applied
        }
        // A moved tank that clicks anywhere else is done for the turn
        None if state == PlayerActionState::UnitMoveConfirmed => {
            finish_unit(battle, id);
            ApplyOutcome::Applied
        }
        None => ApplyOutcome::Ignored,
    }
}

fn confirm_attack(battle: &mut Battle) -> ApplyOutcome {
    if battle.action_state() != PlayerActionState::UnitAttacking {
        return ApplyOutcome::Ignored;
    }
    let (Some(attacker), Some(target)) = (battle.turn.selected_unit, battle.targeted_unit()) else {
        return ApplyOutcome::Ignored;
    };
    if target.coord != battle.turn.selected_tile {
        return ApplyOutcome::Ignored;
    }
    let defender = target.id;

    let rule = battle.retaliation();
    let pass_limit = battle.pass_limit();
    let Battle { map, field, .. } = &mut *battle;
    if resolve_attack(map, field, attacker, defender, rule, pass_limit).is_none() {
        return ApplyOutcome::Ignored;
    }

    finish_unit(battle, attacker);
    ApplyOutcome::Applied
}

fn cancel_move(battle: &mut Battle) -> ApplyOutcome {
    if !battle.action_state().needs_selected_unit() {
        return ApplyOutcome::Ignored;
    }

    let previous = battle.turn.previous_unit_coord;
    if let Some(id) = battle.turn.selected_unit {
        if let Some(unit) = battle.map.unit_mut(id) {
            unit.coord = previous;
        }
    }
    battle.turn.clear_selection();
    battle.turn.action_state = PlayerActionState::Selecting;
    ApplyOutcome::Applied
}

fn end_turn(battle: &mut Battle) -> ApplyOutcome {
    transition(battle, PlayerActionState::Selecting, PlayerActionState::EndingTurn)
}

fn confirm_end(battle: &mut Battle) -> ApplyOutcome {
    if battle.action_state() != PlayerActionState::EndingTurn {
        return ApplyOutcome::Ignored;
    }

    let finishing = battle.current_player();
    battle.map.roster_mut(finishing).clear_moved();
    battle.turn.current_player = finishing.opponent();
    battle.turn.clear_selection();
    battle.turn.action_state = PlayerActionState::Waiting;

    tracing::info!("{} ended their turn, {} is up", finishing, finishing.opponent());
    ApplyOutcome::Applied
}

fn cancel_end(battle: &mut Battle) -> ApplyOutcome {
    transition(battle, PlayerActionState::EndingTurn, PlayerActionState::Selecting)
}

/// Mark the unit as done for the turn and return to selecting
fn finish_unit(battle: &mut Battle, id: UnitId) {
    if let Some(unit) = battle.map.unit_mut(id) {
        unit.moved = true;
    }
    battle.turn.clear_selection();
    battle.turn.action_state = PlayerActionState::Selecting;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::battle_map::BattleMap;
    use crate::battle::definitions::{Definitions, MapDefinition};
    use crate::battle::terrain::TileKind;
    use crate::battle::unit_type::{Archetype, UnitKind};
    use crate::core::config::MatchConfig;
    use crate::core::types::Player;
    use std::sync::Arc;

    fn kind(symbol: char, archetype: Archetype) -> UnitKind {
        UnitKind {
            name: format!("{}", archetype),
            symbol,
            archetype,
            attack_damage: 4,
            attack_range_min: 1,
            attack_range_max: 2,
            movement_range: 4,
            defense: 2,
            health: 10,
            model: String::new(),
        }
    }

    /// 8x8 map: player 1 tank at (0,0) and artillery at (2,0), player 2 tank at (0,5)
    fn battle() -> Battle {
        let map = MapDefinition::open("Skirmish", 8, 8)
            .with_tile(HexCoord::new(4, 4), '#')
            .with_unit(Player::One, HexCoord::new(0, 0), 't')
            .with_unit(Player::One, HexCoord::new(2, 0), 'a')
            .with_unit(Player::Two, HexCoord::new(0, 5), 't');
        let defs = Definitions::new(
            vec![TileKind::new("Grass", '.', false), TileKind::new("Blocked", '#', true)],
            vec![kind('t', Archetype::Tank), kind('a', Archetype::Artillery)],
            vec![map],
        )
        .unwrap();
        let map = BattleMap::new(Arc::new(defs), "Skirmish").unwrap();
        Battle::new(map, &MatchConfig::default())
    }

    fn index(battle: &Battle, col: i32, row: i32) -> i32 {
        battle.map.tile_index(HexCoord::new(col, row)).unwrap() as i32
    }

    fn click(battle: &mut Battle, col: i32, row: i32) {
        let tile_index = index(battle, col, row);
        assert!(CommandExecutor::apply(battle, Command::SelectHex { tile_index }).is_applied());
    }

    fn run(battle: &mut Battle, command: Command) -> ApplyOutcome {
        CommandExecutor::apply(battle, command)
    }

    #[test]
    fn test_start_turn_only_from_ready() {
        let mut battle = battle();
        assert_eq!(run(&mut battle, Command::StartTurn), ApplyOutcome::Applied);
        assert_eq!(battle.action_state(), PlayerActionState::Selecting);
        assert_eq!(run(&mut battle, Command::StartTurn), ApplyOutcome::Ignored);
    }

    #[test]
    fn test_select_hex_out_of_range_is_noop() {
        let mut battle = battle();
        click(&mut battle, 3, 3);
        assert_eq!(run(&mut battle, Command::SelectHex { tile_index: 64 }), ApplyOutcome::Ignored);
        assert_eq!(run(&mut battle, Command::SelectHex { tile_index: -7 }), ApplyOutcome::Ignored);
        assert_eq!(battle.turn.selected_tile, HexCoord::new(3, 3));

        run(&mut battle, Command::SelectHex { tile_index: -1 });
        assert!(battle.turn.selected_tile.is_invalid());
    }

    #[test]
    fn test_select_enemy_unit_ignored() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        click(&mut battle, 0, 5);
        assert_eq!(run(&mut battle, Command::SelectUnit), ApplyOutcome::Ignored);
        assert_eq!(battle.action_state(), PlayerActionState::Selecting);
    }

    #[test]
    fn test_move_then_cancel_restores_position() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        click(&mut battle, 0, 0);
        run(&mut battle, Command::SelectUnit);
        click(&mut battle, 0, 3);
        assert!(run(&mut battle, Command::MoveUnit).is_applied());
        assert_eq!(battle.selected_unit().unwrap().coord, HexCoord::new(0, 3));
        assert_eq!(battle.field.source(), Some(HexCoord::new(0, 0)));

        assert!(run(&mut battle, Command::CancelMove).is_applied());
        assert_eq!(battle.action_state(), PlayerActionState::Selecting);
        assert_eq!(battle.map.unit(UnitId(0)).unwrap().coord, HexCoord::new(0, 0));
        assert!(battle.turn.selected_unit.is_none());
    }

    #[test]
    fn test_move_rejects_far_blocked_and_occupied_tiles() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        click(&mut battle, 0, 0);
        run(&mut battle, Command::SelectUnit);

        for (col, row) in [(0, 5), (2, 0), (4, 4), (7, 7)] {
            click(&mut battle, col, row);
            assert_eq!(run(&mut battle, Command::MoveUnit), ApplyOutcome::Ignored, "({}, {})", col, row);
        }
        assert_eq!(battle.action_state(), PlayerActionState::UnitSelected);
    }

    #[test]
    fn test_confirm_move_requires_clicking_new_tile() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        click(&mut battle, 0, 0);
        run(&mut battle, Command::SelectUnit);
        click(&mut battle, 1, 1);
        run(&mut battle, Command::MoveUnit);

        click(&mut battle, 2, 2);
        assert_eq!(run(&mut battle, Command::ConfirmMove), ApplyOutcome::Ignored);
        click(&mut battle, 1, 1);
        assert!(run(&mut battle, Command::ConfirmMove).is_applied());
        assert_eq!(battle.action_state(), PlayerActionState::UnitMoveConfirmed);
        assert_eq!(battle.field.source(), Some(HexCoord::new(1, 1)));
    }

    #[test]
    fn test_moved_tank_without_target_finishes() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        click(&mut battle, 0, 0);
        run(&mut battle, Command::SelectUnit);
        click(&mut battle, 1, 0);
        run(&mut battle, Command::MoveUnit);
        run(&mut battle, Command::ConfirmMove);

        click(&mut battle, 6, 6);
        assert!(run(&mut battle, Command::Attack).is_applied());
        assert_eq!(battle.action_state(), PlayerActionState::Selecting);
        assert!(battle.map.unit(UnitId(0)).unwrap().moved);
    }

    #[test]
    fn test_attack_out_of_band_ignored_then_in_band_resolves() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        click(&mut battle, 0, 0);
        run(&mut battle, Command::SelectUnit);

        // Enemy at distance 5, band is 1-2
        click(&mut battle, 0, 5);
        assert_eq!(run(&mut battle, Command::Attack), ApplyOutcome::Ignored);

        click(&mut battle, 0, 3);
        run(&mut battle, Command::MoveUnit);
        run(&mut battle, Command::ConfirmMove);
        click(&mut battle, 0, 5);
        assert!(run(&mut battle, Command::Attack).is_applied());
        assert_eq!(battle.action_state(), PlayerActionState::UnitAttacking);

        assert!(run(&mut battle, Command::ConfirmAttack).is_applied());
        // 2*4/2 = 4 each way
        assert_eq!(battle.map.unit(UnitId(2)).unwrap().health, 6);
        assert_eq!(battle.map.unit(UnitId(0)).unwrap().health, 6);
        assert!(battle.map.unit(UnitId(0)).unwrap().moved);
        assert_eq!(battle.action_state(), PlayerActionState::Selecting);
        assert!(battle.turn.targeted_unit.is_none());
    }

    #[test]
    fn test_cycle_selection_skips_moved_units() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        assert!(run(&mut battle, Command::SelectLastUnit).is_applied());
        assert_eq!(battle.turn.selected_unit, Some(UnitId(1)));
        assert_eq!(battle.turn.previous_unit_coord, HexCoord::new(2, 0));

        assert!(run(&mut battle, Command::SelectNextUnit).is_applied());
        assert_eq!(battle.turn.selected_unit, Some(UnitId(0)));

        battle.map.unit_mut(UnitId(1)).unwrap().moved = true;
        assert_eq!(run(&mut battle, Command::SelectPreviousUnit), ApplyOutcome::Ignored);
    }

    #[test]
    fn test_end_turn_flow() {
        let mut battle = battle();
        run(&mut battle, Command::StartTurn);
        assert_eq!(run(&mut battle, Command::ConfirmEnd), ApplyOutcome::Ignored);

        run(&mut battle, Command::EndTurn);
        assert!(run(&mut battle, Command::CancelEnd).is_applied());
        assert_eq!(battle.action_state(), PlayerActionState::Selecting);

        run(&mut battle, Command::EndTurn);
        assert!(run(&mut battle, Command::ConfirmEnd).is_applied());
        assert_eq!(battle.current_player(), Player::Two);
        assert_eq!(battle.action_state(), PlayerActionState::Waiting);
    }

    #[test]
    fn test_session_messages_do_not_touch_state() {
        let mut battle = battle();
        assert_eq!(run(&mut battle, Command::PlayerQuit), ApplyOutcome::Ignored);
        assert_eq!(run(&mut battle, Command::PlayerReady), ApplyOutcome::Ignored);
        assert_eq!(battle.action_state(), PlayerActionState::Ready);
    }
}
