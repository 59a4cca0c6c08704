//! # Obol Headless Driver
//!
//! Runs the engine without a renderer: a scripted pilot walks the bank
//! downstream while the narration log streams to stdout. Useful for smoke
//! testing generation and scheduling on a given seed.

use clap::Parser;
use obol::{Direction, GameState, GameStatus, ObolResult, PlayerIntent};

/// Command line arguments for the Obol driver.
#[derive(Parser, Debug)]
#[command(name = "obol")]
#[command(about = "Turn-based river-crossing roguelike engine, headless driver")]
#[command(version)]
struct Args {
    /// Random seed for world generation
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Maximum scheduler ticks before the run is cut short
    #[arg(short, long, default_value_t = 5000)]
    ticks: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ObolResult<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    log::info!("Starting Obol v{} with seed {}", obol::VERSION, args.seed);
    let mut state = GameState::new(args.seed)?;
    let mut printed = 0;

    for _ in 0..args.ticks {
        if state.status.is_terminal() {
            break;
        }
        let intent = match state.status {
            GameStatus::Idle => Some(pilot_intent(&state)),
            _ => None,
        };
        state.tick(intent)?;

        for line in &state.log.lines()[printed..] {
            println!("{}", line);
        }
        printed = state.log.lines().len();
    }

    println!(
        "-- run over: {:?} on level {} at {:?}",
        state.status,
        state.level,
        state.player_position()
    );
    Ok(())
}

/// Walks downstream along the bank, stepping away from the water's edge when
/// the next column ahead is wet.
fn pilot_intent(state: &GameState) -> PlayerIntent {
    let pos = match state.player_position() {
        Some(pos) => pos,
        None => return PlayerIntent::Wait,
    };
    let center = state.map.river().channel_center(pos.x) as i32;
    let ahead_wet = state.map.is_water(pos.x + 1, pos.y);
    let dir = if ahead_wet {
        if pos.y >= center {
            Direction::North
        } else {
            Direction::South
        }
    } else {
        Direction::East
    };
    PlayerIntent::Move(dir)
}
