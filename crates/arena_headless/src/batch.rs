//! Batch match runner.
//!
//! Runs many seeds in parallel using rayon. Each match is an independent,
//! single-threaded simulation, so results depend only on the seed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use arena_core::config::ArenaConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, MatchMetrics};
use crate::runner::{run_match, MatchConfig, DEFAULT_MAX_TICKS};
use crate::strategies::PlayerStrategy;

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run.
    pub game_count: u32,
    /// Seed of the first match; later matches count up from it.
    pub seed_start: u64,
    /// Tick limit per match (0 = unlimited).
    pub max_ticks: u64,
    /// Scripted player behavior.
    pub strategy: PlayerStrategy,
    /// Maximum parallel matches (0 = rayon default).
    pub parallel_games: u32,
    /// Output directory for results.
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            seed_start: 0,
            max_ticks: DEFAULT_MAX_TICKS,
            strategy: PlayerStrategy::default(),
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create config for `game_count` matches.
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the player strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: PlayerStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the tick limit.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Per-match metrics, in seed order.
    pub games: Vec<MatchMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
    /// Matches that could not be run.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// A match that failed to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index within the batch.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Run a batch of matches on `arena`.
pub fn run_batch(arena: &ArenaConfig, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        games = config.game_count,
        strategy = config.strategy.name(),
        "Starting batch run"
    );

    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MatchMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let match_config = MatchConfig {
                arena: arena.clone(),
                seed,
                strategy: config.strategy,
                max_ticks: config.max_ticks,
            };

            let result = run_match(&match_config).map_err(|e| {
                warn!(game = i, seed, error = %e, "Match failed");
                BatchError {
                    game_index: i,
                    seed,
                    message: e.to_string(),
                }
            });

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 10 == 0 {
                debug!("Progress: {}/{}", done, config.game_count);
            }
            result
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<MatchMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s, win rate {:.1}%",
        games.len(),
        duration_seconds,
        summary.win_rate * 100.0
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Run the same seed `runs` times and check every run ends identically.
pub fn verify_determinism(arena: &ArenaConfig, seed: u64, runs: u32) -> bool {
    let config = MatchConfig {
        arena: arena.clone(),
        ..MatchConfig::new(seed)
    };
    let results: Vec<_> = (0..runs).map(|_| run_match(&config).ok()).collect();
    results.iter().all(Option::is_some) && results.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_strategy(PlayerStrategy::Kiter);

        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.strategy, PlayerStrategy::Kiter);
    }

    #[test]
    fn test_run_batch_small() {
        let config = BatchConfig::new(6).with_max_ticks(300);
        let results = run_batch(&ArenaConfig::default(), config);

        assert_eq!(results.games.len(), 6);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_games, 6);
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (0..6).collect::<Vec<u64>>());
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let arena = ArenaConfig::default();
        let results = run_batch(&arena, BatchConfig::new(4).with_seed(40).with_max_ticks(500));
        for game in &results.games {
            let solo = run_match(&MatchConfig::new(game.seed).with_max_ticks(500)).unwrap();
            assert_eq!(&solo, game);
        }
    }

    #[test]
    fn test_failed_matches_are_collected() {
        let mut arena = ArenaConfig::default();
        arena.layout.spawn_points.truncate(1);
        let results = run_batch(&arena, BatchConfig::new(3));
        assert!(results.games.is_empty());
        assert_eq!(results.errors.len(), 3);
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&ArenaConfig::default(), 12345, 3));
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(&ArenaConfig::default(), BatchConfig::new(3).with_max_ticks(200));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
        assert_eq!(loaded.config, results.config);
    }
}
