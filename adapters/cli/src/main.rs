#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Pipeflow round headlessly.

mod autoplay;
mod board;
mod config_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use pipeflow_core::GamePhase;
use pipeflow_session::GameSession;
use pipeflow_system_pipe_factory::PipeRegistry;

use crate::autoplay::AutoPlayer;

/// Upper bound on simulated time before a round is abandoned.
const MAX_SIMULATED_TIME: Duration = Duration::from_secs(600);

/// Plays one round with an automatic placement strategy and prints the result.
#[derive(Debug, Parser)]
#[command(name = "pipeflow", version, about)]
struct Args {
    /// TOML file overriding the default configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the board layout and pipe queue; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Maximum number of pipes the automatic player places.
    #[arg(long, default_value_t = 24)]
    max_placements: usize,
    /// Log per-step detail.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the Pipeflow command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }

    let mut config = config_file::load(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let registry = PipeRegistry::with_builtin_pipes();
    let mut session =
        GameSession::new(config, &registry).context("failed to create game session")?;
    let mut events = Vec::new();
    session
        .start(&mut events)
        .context("failed to start the round")?;

    println!("seed {}", session.seed());
    println!("required path length {}", session.required_path_length());

    place_pipes(&mut session, args.max_placements);
    println!("path length before flow {}", session.current_path_length());

    session.start_placement_timer();
    run_until_over(&mut session, Duration::from_millis(args.tick_ms))?;

    print!("{}", board::render(session.grid()));
    let outcome = session
        .outcome()
        .context("round finished without an outcome")?;
    println!(
        "{}: fluid travelled {} of {} cells",
        if outcome.won { "won" } else { "lost" },
        outcome.path_length,
        outcome.required_length
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if verbose {
        let _ = builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn place_pipes(session: &mut GameSession, max_placements: usize) {
    let player = AutoPlayer::default();
    let mut events = Vec::new();

    for _ in 0..max_placements {
        if session.current_path_length() >= session.required_path_length() {
            break;
        }
        let Some(position) = player.choose(session) else {
            log::info!("no placement left for the queued pipe");
            break;
        };
        if !session.handle_cell_click(position, &mut events) {
            break;
        }
    }
}

fn run_until_over(session: &mut GameSession, tick: Duration) -> Result<()> {
    let mut events = Vec::new();
    let mut elapsed = Duration::ZERO;

    while session.phase() != GamePhase::GameOver {
        if elapsed > MAX_SIMULATED_TIME {
            bail!("round did not finish within {MAX_SIMULATED_TIME:?} of simulated time");
        }
        session.update(tick, &mut events);
        events.clear();
        elapsed += tick;
    }
    Ok(())
}
