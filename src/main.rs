//! Space Wars headless runner
//!
//! Builds a round from settings, flies every ship with a scripted pilot at a
//! fixed timestep and prints the standings when the round is over.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use space_wars::sim::{Clock, Game, Status, SystemClock};
use space_wars::{Scoreboard, Settings};

#[derive(Debug, Parser)]
#[command(name = "space-wars", version, about = "Run a headless Space Wars round")]
struct Args {
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Asteroid field seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Tick limit
    #[arg(long)]
    max_ticks: Option<u32>,

    /// Fixed step in milliseconds
    #[arg(long)]
    step_ms: Option<f64>,

    /// Leave the arena empty of asteroids
    #[arg(long)]
    no_asteroids: bool,

    /// Continue from a saved world state instead of a fresh round
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write the final world state here as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(max_ticks) = args.max_ticks {
        settings.max_ticks = max_ticks;
    }
    if let Some(step_ms) = args.step_ms {
        settings.step_ms = step_ms;
    }
    if args.no_asteroids {
        settings.asteroids = false;
    }
    settings.validate()?;

    let mut game = match &args.resume {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Game::from_json(&json)?
        }
        None => {
            let seed = args
                .seed
                .or(settings.seed)
                .unwrap_or_else(|| SystemClock.now_ms());
            settings.build_game(seed)?
        }
    };
    log::info!(
        "Space Wars starting: seed {}, {} ships, {} entities",
        game.seed(),
        game.registry().ship_count(),
        game.entities().len()
    );

    game.start();
    let mut ticks = 0;
    while ticks < settings.max_ticks && game.status() != Status::Ended {
        fly(&mut game, ticks);
        game.update(settings.step_ms);
        ticks += 1;
    }
    log::info!(
        "Stopped after {ticks} ticks ({:.1} s simulated), status {}",
        ticks as f64 * settings.step_ms / 1000.0,
        game.status()
    );

    print_standings(&Scoreboard::from_game(&game));

    if let Some(path) = &args.output {
        std::fs::write(path, game.to_json()?).with_context(|| format!("writing {}", path.display()))?;
        log::info!("World state written to {}", path.display());
    }
    Ok(())
}

/// Scripted pilot: cruise, weave every few seconds and keep firing
fn fly(game: &mut Game, tick: u32) {
    let pilots: Vec<String> = game
        .registry()
        .ships()
        .filter(|ship| ship.enabled())
        .map(|ship| ship.name().to_string())
        .collect();

    for (slot, name) in pilots.iter().enumerate() {
        let slot = slot as u32;
        let (left, right) = match (tick / 90 + slot) % 3 {
            0 => (40.0, 0.0),
            1 => (0.0, 40.0),
            _ => (0.0, 0.0),
        };

        let flown = game.with_ship(name, |ship, ctx| {
            // Coast when low so the guns can recharge
            let main = if ship.energy() < 30.0 { 0.0 } else { 70.0 };
            if let Err(e) = ship.set_engine_thrust(main, left, right) {
                log::warn!("{name}: {e}");
            }
            if (tick + slot * 7) % 20 == 0 {
                if let Err(e) = ship.fire_laser(ctx) {
                    log::trace!("{name}: laser: {e}");
                }
            }
            if (tick + slot * 31) % 240 == 0 {
                if let Err(e) = ship.fire_rocket(ctx) {
                    log::trace!("{name}: rocket: {e}");
                }
            }
        });
        if let Err(e) = flown {
            log::warn!("{e}");
        }
    }
}

fn print_standings(board: &Scoreboard) {
    println!("{:<4} {:<16} {:>8} {:>6}  status", "#", "ship", "score", "kills");
    for (rank, standing) in board.entries.iter().enumerate() {
        println!(
            "{:<4} {:<16} {:>8.1} {:>6}  {}",
            rank + 1,
            standing.name,
            standing.score,
            standing.kills,
            if standing.alive { "alive" } else { "destroyed" }
        );
    }
}
