//! Headless arena runner for scripted matches and CI verification.
//!
//! This crate runs arena levels without presentation, driving the player
//! with a scripted strategy. This enables:
//!
//! - **Balance checks**: Win rates and kill counts over many seeds
//! - **CI verification**: Automated testing of game logic and determinism
//!
//! # Example
//!
//! ```bash
//! # One match, JSON summary on stdout
//! cargo run -p arena_headless -- run --seed 42 --strategy hunter
//!
//! # A thousand seeds in parallel
//! cargo run -p arena_headless -- batch --count 1000 --output results/
//! ```

pub mod batch;
pub mod metrics;
pub mod runner;
pub mod strategies;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, MatchMetrics, MatchOutcome, MetricsCollector};
pub use runner::{run_match, MatchConfig, MatchRunner, RunnerError};
pub use strategies::PlayerStrategy;
