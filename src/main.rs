//! Hex Tactics - Entry Point
//!
//! Hotseat driver: both players share one terminal. Every input line is one
//! frame of the game loop.

use hex_tactics::battle::{Battle, Definitions, FrameView, HexCoord};
use hex_tactics::command::{FrameInput, InputAction, NullTransport, Session};
use hex_tactics::core::config::{MatchConfig, Seat};
use hex_tactics::core::error::Result;
use hex_tactics::core::types::Player;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hex_tactics=info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MatchConfig::load(Path::new(&path))?,
        None => MatchConfig::default(),
    };

    tracing::info!("Hex Tactics starting with map '{}'", config.default_map);

    let defs = Arc::new(Definitions::load_dir(&config.data_dir)?);
    let battle = Battle::from_definitions(defs, &config)?;
    let mut session = Session::new(battle, Seat::Hotseat, NullTransport);

    println!("\n=== HEX TACTICS ===");
    println!();
    println!("Commands:");
    println!("  hex <col> <row> - Move the cursor over a tile");
    println!("  click / c       - Select");
    println!("  enter / e       - Confirm");
    println!("  esc / x         - Cancel");
    println!("  left / right    - Cycle units");
    println!("  pause / p       - Toggle pause");
    println!("  status / s      - Show the board");
    println!("  quit / q        - Exit the game");
    println!();

    let mut view = session.update(&FrameInput::new());

    loop {
        println!("{} - {}", view.current_player, view.action_state);
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();

        let input = match words.as_slice() {
            [] => FrameInput::new(),
            ["quit" | "q"] => break,
            ["status" | "s"] => {
                display_board(session.battle(), &view);
                continue;
            }
            ["hex", col, row] => match (col.parse::<i32>(), row.parse::<i32>()) {
                (Ok(col), Ok(row)) => FrameInput::hovering(HexCoord::new(col, row)),
                _ => {
                    println!("Usage: hex <col> <row>");
                    continue;
                }
            },
            ["click" | "c"] => FrameInput::new().press(InputAction::Select),
            ["enter" | "e"] => FrameInput::new().press(InputAction::Confirm),
            ["esc" | "x"] => FrameInput::new().press(InputAction::Cancel),
            ["left"] => FrameInput::new().press(InputAction::CycleLeft),
            ["right"] => FrameInput::new().press(InputAction::CycleRight),
            ["pause" | "p"] => FrameInput::new().press(InputAction::Pause),
            _ => {
                println!("Unknown command: {}", line.trim());
                continue;
            }
        };

        view = session.update(&input);

        if let Some(stats) = &view.stat_block {
            println!(
                "  {} ({}) ATK {} DEF {} RNG {}-{} MOV {} HP {}/{}",
                stats.name,
                stats.owner,
                stats.attack,
                stats.defense,
                stats.range_min,
                stats.range_max,
                stats.movement,
                stats.health,
                stats.max_health
            );
        }
        if view.paused {
            println!("  (paused)");
        }
        if let Some(outcome) = view.outcome {
            display_board(session.battle(), &view);
            println!("\n{} wins!", outcome.winner);
            break;
        }
    }

    Ok(())
}

/// Print the map, top row first
///
/// Units show their kind symbol (upper case for player 2); `*` marks the
/// path, `!` attackable enemies, `+` reachable tiles, `@` the cursor.
fn display_board(battle: &Battle, view: &FrameView) {
    let map = &battle.map;
    println!();
    for row in (0..map.height() as i32).rev() {
        let mut line = String::new();
        for col in 0..map.width() as i32 {
            let coord = HexCoord::new(col, row);
            let symbol = if let Some(unit) = map.unit_at(coord, None) {
                let symbol = map.unit_kind(unit).symbol;
                match unit.owner {
                    Player::One => symbol.to_ascii_lowercase(),
                    Player::Two => symbol.to_ascii_uppercase(),
                }
            } else if view.path_tiles.contains(&coord) {
                '*'
            } else if coord == view.selected_tile {
                '@'
            } else if view.reachable_tiles.contains(&coord) {
                '+'
            } else {
                map.tile(coord).map_or(' ', |tile| map.tile_kind(tile).symbol)
            };
            let marker = if view.attackable_tiles.contains(&coord) { '!' } else { ' ' };
            line.push(symbol);
            line.push(marker);
        }
        println!("{:>3} {}", row, line);
    }
    println!();
}
