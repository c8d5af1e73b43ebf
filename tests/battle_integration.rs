//! Battle system integration tests

use std::sync::Arc;

use hex_tactics::battle::*;
use hex_tactics::command::{ApplyOutcome, Command, CommandExecutor};
use hex_tactics::core::config::MatchConfig;
use hex_tactics::core::types::{Player, UnitId};

fn unit_kind(symbol: char, archetype: Archetype) -> UnitKind {
    UnitKind {
        name: format!("{} {}", archetype, symbol),
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

fn tiles() -> Vec<TileKind> {
    vec![
        TileKind::new("Grass", '.', false),
        TileKind::new("Blocked", '#', true),
    ]
}

fn build(map: MapDefinition) -> Battle {
    let name = map.name.clone();
    let units = vec![
        unit_kind('t', Archetype::Tank),
        unit_kind('a', Archetype::Artillery),
    ];
    let defs = Arc::new(Definitions::new(tiles(), units, vec![map]).unwrap());
    Battle::new(BattleMap::new(defs, &name).unwrap(), &MatchConfig::default())
}

fn apply(battle: &mut Battle, command: Command) -> ApplyOutcome {
    CommandExecutor::apply(battle, command)
}

fn select_hex(battle: &mut Battle, coord: HexCoord) {
    let tile_index = battle.map.tile_index(coord).unwrap() as i32;
    assert_eq!(apply(battle, Command::SelectHex { tile_index }), ApplyOutcome::Applied);
}

/// Select the unit at `from`, move it to `to` and confirm
fn move_and_confirm(battle: &mut Battle, from: HexCoord, to: HexCoord) {
    select_hex(battle, from);
    assert_eq!(apply(battle, Command::SelectUnit), ApplyOutcome::Applied);
    assert_eq!(battle.action_state(), PlayerActionState::UnitSelected);

    select_hex(battle, to);
    assert_eq!(apply(battle, Command::MoveUnit), ApplyOutcome::Applied);
    assert_eq!(battle.action_state(), PlayerActionState::UnitMoved);
    assert_eq!(battle.selected_unit().unwrap().coord, to);

    assert_eq!(apply(battle, Command::ConfirmMove), ApplyOutcome::Applied);
}

#[test]
fn test_tank_keeps_attack_after_confirming_move() {
    let mut battle = build(
        MapDefinition::open("Grid12x12", 12, 12)
            .with_unit(Player::One, HexCoord::new(0, 0), 't')
            .with_unit(Player::Two, HexCoord::new(11, 11), 't'),
    );
    apply(&mut battle, Command::StartTurn);

    let destination = HexCoord::new(0, 3);
    assert_eq!(HexCoord::new(0, 0).taxicab_distance(&destination), 3);
    move_and_confirm(&mut battle, HexCoord::new(0, 0), destination);

    assert_eq!(battle.action_state(), PlayerActionState::UnitMoveConfirmed);
    let unit = battle.selected_unit().unwrap();
    assert_eq!(unit.coord, destination);
    assert!(!unit.moved);
}

#[test]
fn test_artillery_confirming_move_ends_its_action() {
    let mut battle = build(
        MapDefinition::open("Grid12x12", 12, 12)
            .with_unit(Player::One, HexCoord::new(0, 0), 'a')
            .with_unit(Player::Two, HexCoord::new(11, 11), 't'),
    );
    apply(&mut battle, Command::StartTurn);
    move_and_confirm(&mut battle, HexCoord::new(0, 0), HexCoord::new(2, 1));

    assert_eq!(battle.action_state(), PlayerActionState::Selecting);
    assert!(battle.turn.selected_unit.is_none());
    let unit = battle.map.unit(UnitId(0)).unwrap();
    assert_eq!(unit.coord, HexCoord::new(2, 1));
    assert!(unit.moved);

    // A moved unit cannot be picked again this turn
    select_hex(&mut battle, HexCoord::new(2, 1));
    assert_eq!(apply(&mut battle, Command::SelectUnit), ApplyOutcome::Ignored);
}

#[test]
fn test_primary_damage_formula() {
    assert_eq!(calculate_damage(4, 2), 4);

    let mut battle = build(
        MapDefinition::open("Duel", 6, 6)
            .with_unit(Player::One, HexCoord::new(2, 2), 't')
            .with_unit(Player::Two, HexCoord::new(2, 3), 't'),
    );
    apply(&mut battle, Command::StartTurn);
    select_hex(&mut battle, HexCoord::new(2, 2));
    apply(&mut battle, Command::SelectUnit);
    select_hex(&mut battle, HexCoord::new(2, 3));
    assert_eq!(apply(&mut battle, Command::Attack), ApplyOutcome::Applied);
    assert_eq!(apply(&mut battle, Command::ConfirmAttack), ApplyOutcome::Applied);

    let defender = battle.map.unit(UnitId(1)).unwrap();
    assert_eq!(defender.health, 6);
}

#[test]
fn test_blocked_ring_isolates_source() {
    let source = HexCoord::new(6, 6);
    let mut map = MapDefinition::open("Ring", 12, 12);
    for neighbor in source.neighbors() {
        map = map.with_tile(neighbor, '#');
    }
    let battle = build(map);

    let mut field = CostField::for_map(&battle.map);
    field.populate(&battle.map, source, battle.pass_limit());

    assert_eq!(field.cost_at(source), 0);
    for tile in battle.map.tiles() {
        if tile.coord != source {
            assert_eq!(field.cost_at(tile.coord), UNREACHABLE_COST);
        }
    }
}

#[test]
fn test_confirm_end_hands_over_and_resets_moved() {
    let mut battle = build(
        MapDefinition::open("Grid12x12", 12, 12)
            .with_unit(Player::One, HexCoord::new(0, 0), 't')
            .with_unit(Player::One, HexCoord::new(1, 0), 't')
            .with_unit(Player::One, HexCoord::new(2, 0), 'a')
            .with_unit(Player::Two, HexCoord::new(11, 11), 't'),
    );
    apply(&mut battle, Command::StartTurn);
    for id in 0..4 {
        battle.map.unit_mut(UnitId(id)).unwrap().moved = true;
    }

    apply(&mut battle, Command::EndTurn);
    assert_eq!(apply(&mut battle, Command::ConfirmEnd), ApplyOutcome::Applied);

    assert_eq!(battle.current_player(), Player::Two);
    assert_eq!(battle.action_state(), PlayerActionState::Waiting);
    assert_eq!(battle.map.roster(Player::One).len(), 3);
    assert!(battle.map.roster(Player::One).iter().all(|u| !u.moved));
    // Only the finishing player's units are reset
    assert!(battle.map.unit(UnitId(3)).unwrap().moved);
}

#[test]
fn test_tile_index_minus_one_clears_selection() {
    let mut battle = build(MapDefinition::open("Grid12x12", 12, 12));
    select_hex(&mut battle, HexCoord::new(4, 4));

    let command: Command = "SelectHex TileIndex=-1".parse().unwrap();
    assert_eq!(apply(&mut battle, command), ApplyOutcome::Applied);
    assert_eq!(battle.turn.selected_tile, HexCoord::new(-1, -1));
}

#[test]
fn test_every_command_keeps_state_in_table() {
    let commands = [
        Command::StartTurn,
        Command::SelectHex { tile_index: 0 },
        Command::SelectHex { tile_index: 9999 },
        Command::SelectUnit,
        Command::SelectFirstUnit,
        Command::SelectLastUnit,
        Command::SelectPreviousUnit,
        Command::SelectNextUnit,
        Command::MoveUnit,
        Command::ConfirmMove,
        Command::Attack,
        Command::ConfirmAttack,
        Command::CancelMove,
        Command::EndTurn,
        Command::ConfirmEnd,
        Command::CancelEnd,
    ];

    for state in PlayerActionState::ALL {
        for command in commands {
            let mut battle = build(
                MapDefinition::open("Closure", 6, 6)
                    .with_unit(Player::One, HexCoord::new(0, 0), 't')
                    .with_unit(Player::Two, HexCoord::new(0, 1), 't'),
            );
            battle.turn.action_state = state;
            if state.needs_selected_unit() {
                battle.turn.selected_unit = Some(UnitId(0));
                battle.turn.targeted_unit = Some(UnitId(1));
                battle.turn.previous_unit_coord = HexCoord::new(0, 0);
            }

            apply(&mut battle, command);
            assert!(PlayerActionState::ALL.contains(&battle.action_state()));
            if battle.action_state().needs_selected_unit() {
                assert!(battle.selected_unit().is_some(), "{} after {}", state, command);
            }
        }
    }
}

#[test]
fn test_dead_units_are_never_queryable() {
    let tough = UnitKind {
        attack_damage: 20,
        ..unit_kind('t', Archetype::Tank)
    };
    let map = MapDefinition::open("Execution", 6, 6)
        .with_unit(Player::One, HexCoord::new(2, 2), 't')
        .with_unit(Player::Two, HexCoord::new(2, 3), 't');
    let defs = Arc::new(Definitions::new(tiles(), vec![tough], vec![map]).unwrap());
    let mut battle = Battle::new(BattleMap::new(defs, "Execution").unwrap(), &MatchConfig::default());

    apply(&mut battle, Command::StartTurn);
    select_hex(&mut battle, HexCoord::new(2, 2));
    apply(&mut battle, Command::SelectUnit);
    select_hex(&mut battle, HexCoord::new(2, 3));
    apply(&mut battle, Command::Attack);
    apply(&mut battle, Command::ConfirmAttack);

    // 2*20/2 = 20 damage both ways: both die
    assert!(battle.map.unit(UnitId(0)).is_none());
    assert!(battle.map.unit(UnitId(1)).is_none());
    assert!(battle.map.unit_at(HexCoord::new(2, 3), None).is_none());
    assert!(battle.map.roster(Player::One).is_empty());
    assert_eq!(battle.action_state(), PlayerActionState::Selecting);

    // Player 1's empty roster is checked first
    assert_eq!(battle.check_match_end().unwrap().winner, Player::Two);
}
