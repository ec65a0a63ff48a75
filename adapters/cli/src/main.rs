#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Grid Pulse matches.

mod autopilot;
mod terminal;

use std::{fs, io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use gridpulse_core::MatchStatus;
use gridpulse_rendering::{palette, FrameControl, Presentation, RenderingBackend, Scene};
use gridpulse_system_session::{Config, Session};
use gridpulse_world::{query, TieBreak};

use crate::{autopilot::Autopilot, terminal::TerminalBackend};

#[derive(Parser, Debug)]
#[command(version, about = "Runs a headless Grid Pulse match driven by an autopilot", long_about = None)]
struct Args {
    /// TOML file with match settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for spawns, shuffled ties and the autopilot
    #[arg(long)]
    seed: Option<u64>,

    /// Number of player turns before the run stops
    #[arg(long, default_value_t = 200)]
    turns: u32,

    /// Frames simulated between two turns
    #[arg(long, default_value_t = 8)]
    frames_per_turn: u32,

    /// Simulated duration of one frame in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Overrides the spawn interval in milliseconds
    #[arg(long)]
    spawn_interval_ms: Option<u64>,

    /// Break path ties randomly instead of in grid order
    #[arg(long)]
    shuffle_ties: bool,

    /// Print status lines only
    #[arg(long)]
    quiet_board: bool,

    /// Drive spawns from the frame clock instead of a thread; output is reproducible
    #[arg(long)]
    replay: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Entry point for the Grid Pulse command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    log::debug!("starting match with {config:?}");
    let mut session = if args.replay {
        Session::manual(config)
    } else {
        Session::start(config).context("failed to start the spawner thread")?
    };
    println!("{}", query::welcome_banner(session.world()));

    let frame = Duration::from_millis(args.frame_ms.max(1));
    let frames_per_turn = args.frames_per_turn.max(1);
    let mut autopilot = Autopilot::new(config.rng_seed);
    let mut frames_until_turn = frames_per_turn;
    let mut turns_left = args.turns;

    let presentation = Presentation::new(
        "Grid Pulse",
        palette::OPEN_CELL,
        Scene::capture(session.world()),
    );
    TerminalBackend::new(io::stdout().lock(), frame, frames_per_turn)
        .with_board(!args.quiet_board)
        .paced(!args.replay)
        .run(presentation, |dt, scene| {
            let _ = session.frame(dt);
            frames_until_turn -= 1;
            if frames_until_turn == 0 {
                frames_until_turn = frames_per_turn;
                if turns_left > 0 && session.status().is_running() {
                    let action = autopilot.choose(session.world());
                    let _ = session.act(action);
                    turns_left -= 1;
                }
            }

            *scene = Scene::capture(session.world());
            let finished = !session.status().is_running() || turns_left == 0;
            Ok(if finished {
                FrameControl::Exit
            } else {
                FrameControl::Continue
            })
        })?;

    session.shutdown();
    let outcome = match session.status() {
        MatchStatus::Running => "survived",
        MatchStatus::Won => "won",
        MatchStatus::Lost => "lost",
    };
    println!(
        "match {outcome} after {} turns with {} energy",
        args.turns - turns_left,
        query::player(session.world()).energy()
    );
    Ok(())
}

fn init_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Config::from_toml_str(&contents)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    if let Some(interval) = args.spawn_interval_ms {
        config.spawn_interval = Duration::from_millis(interval);
    }
    if args.shuffle_ties {
        config.tie_break = TieBreak::Shuffled;
    }
    config.validate().context("invalid match configuration")?;
    Ok(config)
}
