//! Headless arena runner.
//!
//! Runs arena levels without presentation, with the player driven by a
//! scripted strategy.
//!
//! # Usage
//!
//! ```bash
//! # Run a single match and print its metrics as JSON
//! cargo run -p arena_headless -- run --seed 7 --strategy kiter
//!
//! # Run a batch of seeds in parallel
//! cargo run -p arena_headless -- batch --count 1000 --output results/
//!
//! # Check that a seed replays identically
//! cargo run -p arena_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arena_core::config::ArenaConfig;
use arena_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{run_match, MatchConfig, RunnerError, DEFAULT_MAX_TICKS},
    strategies::PlayerStrategy,
};

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless arena runner for scripted matches and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Arena config file (RON); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match
    Run {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Scripted player behavior
        #[arg(short, long, value_enum, default_value_t = PlayerStrategy::Hunter)]
        strategy: PlayerStrategy,

        /// Tick limit (0 = unlimited)
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: u64,

        /// Pretty-print the JSON summary
        #[arg(long)]
        pretty: bool,
    },

    /// Run a batch of matches in parallel
    Batch {
        /// Number of matches to run
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Scripted player behavior
        #[arg(short, long, value_enum, default_value_t = PlayerStrategy::Hunter)]
        strategy: PlayerStrategy,

        /// Tick limit per match (0 = unlimited)
        #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
        max_ticks: u64,
    },

    /// Verify determinism by running the same seed several times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = load_arena(cli.config.as_deref()).and_then(|arena| match cli.command {
        Commands::Run {
            seed,
            strategy,
            max_ticks,
            pretty,
        } => cmd_run(arena, seed, strategy, max_ticks, pretty),
        Commands::Batch {
            count,
            parallel,
            output,
            seed,
            strategy,
            max_ticks,
        } => {
            let config = BatchConfig {
                parallel_games: parallel,
                ..BatchConfig::new(count)
                    .with_output(output)
                    .with_seed(seed)
                    .with_strategy(strategy)
                    .with_max_ticks(max_ticks)
            };
            cmd_batch(&arena, config)
        }
        Commands::Verify { seed, runs } => Ok(cmd_verify(&arena, seed, runs)),
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_arena(path: Option<&Path>) -> Result<ArenaConfig, RunnerError> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading arena config");
            Ok(ArenaConfig::load(path)?)
        }
        None => Ok(ArenaConfig::default()),
    }
}

/// Run a single match and print its metrics
fn cmd_run(
    arena: ArenaConfig,
    seed: u64,
    strategy: PlayerStrategy,
    max_ticks: u64,
    pretty: bool,
) -> Result<ExitCode, RunnerError> {
    let config = MatchConfig {
        arena,
        seed,
        strategy,
        max_ticks,
    };
    let metrics = run_match(&config)?;

    tracing::info!(
        outcome = ?metrics.outcome,
        ticks = metrics.duration_ticks,
        kills = metrics.player_kills,
        "Match complete"
    );

    let json = if pretty {
        serde_json::to_string_pretty(&metrics)?
    } else {
        serde_json::to_string(&metrics)?
    };
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

/// Run a batch of matches and save the results
fn cmd_batch(arena: &ArenaConfig, config: BatchConfig) -> Result<ExitCode, RunnerError> {
    let path = config.output_dir.join("batch.json");
    let results = run_batch(arena, config);
    results.save(&path)?;

    let summary = &results.summary;
    eprintln!("╔════════════════════════════════════╗");
    eprintln!("║ Games:      {:>22} ║", summary.total_games);
    eprintln!("║ Win rate:   {:>21.1}% ║", summary.win_rate * 100.0);
    eprintln!("║ Avg ticks:  {:>22.0} ║", summary.avg_duration_ticks);
    eprintln!("║ Avg kills:  {:>22.2} ║", summary.avg_player_kills);
    eprintln!("║ Errors:     {:>22} ║", results.errors.len());
    eprintln!("╚════════════════════════════════════╝");
    tracing::info!(path = %path.display(), "Results saved");

    Ok(if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Verify that a seed replays identically
fn cmd_verify(arena: &ArenaConfig, seed: u64, runs: u32) -> ExitCode {
    tracing::info!(seed, runs, "Verifying determinism");
    if verify_determinism(arena, seed, runs) {
        tracing::info!("All runs identical");
        ExitCode::SUCCESS
    } else {
        tracing::error!("Runs diverged");
        ExitCode::FAILURE
    }
}
