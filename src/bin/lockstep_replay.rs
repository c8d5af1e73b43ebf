//! Lockstep Replay
//!
//! Replays a scripted input log through two networked peers joined by
//! in-memory queues, then checks that both ended in the same state.
//!
//! Script format, one frame per line (`#` starts a comment):
//!
//! ```text
//! 1 enter
//! 1 hex 3 4
//! 1 click
//! 2 esc
//! ```
//!
//! The leading number is the player whose machine receives the input.

use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use hex_tactics::battle::{Battle, BattleSnapshot, Definitions, HexCoord, MatchOutcome};
use hex_tactics::command::{pump, FrameInput, InputAction, QueueTransport, Session};
use hex_tactics::core::config::{MatchConfig, Seat};
use hex_tactics::core::error::{Result, TacticsError};
use hex_tactics::core::types::Player;

/// Lockstep Replay - verify two peers stay in agreement
#[derive(Parser, Debug)]
#[command(name = "lockstep_replay")]
#[command(about = "Replay an input script through two networked peers and compare their state")]
struct Args {
    /// Input script, one frame per line
    script: PathBuf,

    /// Match config file (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the directory holding tiles.toml, units.toml and maps.toml
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the map to play
    #[arg(long)]
    map: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print the final snapshot of player 1's peer
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct ReplayReport {
    map: String,
    frames: usize,
    lines_exchanged: usize,
    converged: bool,
    current_player: Player,
    action_state: String,
    units_remaining: [usize; 2],
    outcome: Option<MatchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<BattleSnapshot>,
}

/// One scripted frame
struct ScriptFrame {
    player: Player,
    input: FrameInput,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hex_tactics=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(map) = &args.map {
        config.default_map = map.clone();
    }

    let script = parse_script(&fs::read_to_string(&args.script)?)?;
    let defs = Arc::new(Definitions::load_dir(&config.data_dir)?);

    let mut peers = [
        Session::new(
            Battle::from_definitions(Arc::clone(&defs), &config)?,
            Seat::Networked { player: Player::One },
            QueueTransport::new(),
        ),
        Session::new(
            Battle::from_definitions(defs, &config)?,
            Seat::Networked { player: Player::Two },
            QueueTransport::new(),
        ),
    ];

    let mut exchanged = exchange(&mut peers);
    for frame in &script {
        let index = match frame.player {
            Player::One => 0,
            Player::Two => 1,
        };
        peers[index].update(&frame.input);
        exchanged += exchange(&mut peers);
    }

    // Let both peers drain whatever is still in flight
    while peers.iter().any(|p| p.transport().pending_outbound() > 0) {
        exchanged += exchange(&mut peers);
    }

    let left = peers[0].battle().snapshot();
    let right = peers[1].battle().snapshot();
    let converged = serde_json::to_string(&left)? == serde_json::to_string(&right)?;

    let battle = peers[0].battle();
    let report = ReplayReport {
        map: battle.map.name().to_string(),
        frames: script.len(),
        lines_exchanged: exchanged,
        converged,
        current_player: battle.current_player(),
        action_state: battle.action_state().to_string(),
        units_remaining: [
            battle.map.roster(Player::One).len(),
            battle.map.roster(Player::Two).len(),
        ],
        outcome: peers[0].outcome(),
        snapshot: args.verbose.then_some(left),
    };

    match args.format.as_str() {
        "text" => {
            println!("=== Lockstep Replay ===");
            println!("Map: {}", report.map);
            println!("Frames: {}", report.frames);
            println!("Lines exchanged: {}", report.lines_exchanged);
            println!("Turn: {} ({})", report.current_player, report.action_state);
            println!(
                "Units: {} vs {}",
                report.units_remaining[0], report.units_remaining[1]
            );
            if let Some(outcome) = report.outcome {
                println!("Winner: {}", outcome.winner);
            }
            println!("Converged: {}", if converged { "yes" } else { "NO" });
            if let Some(snapshot) = &report.snapshot {
                println!("{}", serde_json::to_string_pretty(snapshot)?);
            }
        }
        _ => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(converged)
}

/// Deliver queued lines both ways and let each peer apply them
fn exchange(peers: &mut [Session<QueueTransport>; 2]) -> usize {
    let [left, right] = peers;
    let moved = pump(left.transport_mut(), right.transport_mut())
        + pump(right.transport_mut(), left.transport_mut());
    if moved > 0 {
        left.update(&FrameInput::new());
        right.update(&FrameInput::new());
    }
    moved
}

fn parse_script(text: &str) -> Result<Vec<ScriptFrame>> {
    let mut frames = Vec::new();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let bad_line = || {
            TacticsError::MalformedCommand(format!("script line {}: '{}'", number + 1, raw.trim()))
        };

        let player = words
            .first()
            .and_then(|w| w.parse::<u8>().ok())
            .and_then(Player::from_number)
            .ok_or_else(bad_line)?;

        let input = match &words[1..] {
            [] | ["wait"] => FrameInput::new(),
            ["hex", col, row] => {
                let col = col.parse::<i32>().map_err(|_| bad_line())?;
                let row = row.parse::<i32>().map_err(|_| bad_line())?;
                FrameInput::hovering(HexCoord::new(col, row))
            }
            ["click"] => FrameInput::new().press(InputAction::Select),
            ["enter"] => FrameInput::new().press(InputAction::Confirm),
            ["esc"] => FrameInput::new().press(InputAction::Cancel),
            ["left"] => FrameInput::new().press(InputAction::CycleLeft),
            ["right"] => FrameInput::new().press(InputAction::CycleRight),
            ["pause"] => FrameInput::new().press(InputAction::Pause),
            _ => return Err(bad_line()),
        };

        frames.push(ScriptFrame { player, input });
    }

    Ok(frames)
}
