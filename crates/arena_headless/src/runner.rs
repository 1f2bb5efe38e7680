//! Single-match runner.
//!
//! Builds a level from an [`ArenaConfig`], starts play, feeds a scripted
//! [`PlayerStrategy`] and collects [`MatchMetrics`] until the level ends or
//! the tick limit runs out.

use std::path::Path;
use std::result::Result;

use arena_core::config::ConfigError;
use arena_core::prelude::*;
use thiserror::Error;

use crate::metrics::{MatchMetrics, MetricsCollector};
use crate::strategies::PlayerStrategy;

/// Default tick limit: five minutes at 20 ticks per second.
pub const DEFAULT_MAX_TICKS: u64 = 6_000;

/// Error type for headless runs.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration could not be loaded.
    #[error("Failed to load arena config: {0}")]
    Config(#[from] ConfigError),
    /// The level could not be set up.
    #[error("Failed to set up level: {0}")]
    Arena(#[from] ArenaError),
    /// Writing results failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Results could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One scripted match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Arena settings. The seed is overridden by `seed`.
    pub arena: ArenaConfig,
    /// Seed for this match.
    pub seed: u64,
    /// Scripted player behavior.
    pub strategy: PlayerStrategy,
    /// Tick limit (0 = unlimited).
    pub max_ticks: u64,
}

impl MatchConfig {
    /// Default arena with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            arena: ArenaConfig::default(),
            seed,
            strategy: PlayerStrategy::default(),
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    /// Load arena settings from a RON file.
    pub fn with_arena_file(mut self, path: &Path) -> Result<Self, RunnerError> {
        self.arena = ArenaConfig::load(path)?;
        Ok(self)
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

/// Steps a started level under a scripted player.
#[derive(Debug)]
pub struct MatchRunner {
    sim: Simulation,
    strategy: PlayerStrategy,
    collector: MetricsCollector,
    max_ticks: u64,
}

impl MatchRunner {
    /// Build the level and start play.
    pub fn new(config: &MatchConfig) -> Result<Self, RunnerError> {
        let mut sim = Simulation::new(config.arena.clone().with_seed(config.seed));
        sim.initialize_level()?;
        sim.start_game()?;

        let collector = MetricsCollector::new(config.seed, config.strategy.name(), sim.player());
        Ok(Self {
            sim,
            strategy: config.strategy,
            collector,
            max_ticks: config.max_ticks,
        })
    }

    /// The simulation being run.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Whether the match is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.collector.is_finished()
            || (self.max_ticks > 0 && self.sim.current_tick() >= self.max_ticks)
    }

    /// Decide the player's input and advance one tick.
    pub fn step(&mut self) -> TickEvents {
        let input = self.strategy.decide(&self.sim);
        self.sim.set_player_input(input);
        let events = self.sim.tick();
        self.collector.observe(&events);
        events
    }

    /// Step until the match ends.
    #[must_use]
    pub fn run_to_end(mut self) -> MatchMetrics {
        while !self.is_finished() {
            self.step();
        }
        let hash = self.sim.state_hash();
        tracing::debug!(
            tick = self.sim.current_tick(),
            phase = ?self.sim.phase(),
            state_hash = hash,
            "Match finished"
        );
        self.collector.finish(hash)
    }
}

/// Run one scripted match to completion.
pub fn run_match(config: &MatchConfig) -> Result<MatchMetrics, RunnerError> {
    Ok(MatchRunner::new(config)?.run_to_end())
}
