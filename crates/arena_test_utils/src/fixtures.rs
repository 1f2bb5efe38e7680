//! Test fixtures and helpers.
//!
//! Pre-built configurations and arena setups for consistent testing.

use arena_core::components::EntityId;
use arena_core::config::{ArenaConfig, ArenaLayout};
use arena_core::math::Vec2Fixed;
use arena_core::simulation::Simulation;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a ground-plane vector from integer coordinates.
#[must_use]
pub fn vec2(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Default configuration without obstacles.
#[must_use]
pub fn open_arena_config() -> ArenaConfig {
    ArenaConfig {
        layout: ArenaLayout {
            obstacles: Vec::new(),
            ..ArenaLayout::default()
        },
        ..ArenaConfig::default()
    }
}

/// A player and one bot placed by hand, AI not started.
#[derive(Debug)]
pub struct Duel {
    /// The simulation.
    pub sim: Simulation,
    /// Player id.
    pub player: EntityId,
    /// Bot id.
    pub bot: EntityId,
}

/// Place the player at `player_at` and a bot at `bot_at` in an open arena.
///
/// # Panics
///
/// Panics if either spawn fails, which only happens with a broken config.
#[must_use]
pub fn duel(config: ArenaConfig, player_at: Vec2Fixed, bot_at: Vec2Fixed) -> Duel {
    let mut sim = Simulation::new(config);
    let player = sim.spawn_player(player_at).expect("player spawn");
    let bot = sim.spawn_bot(bot_at, false).expect("bot spawn");
    Duel { sim, player, bot }
}

/// A full level with the opening wave placed and play started.
///
/// # Panics
///
/// Panics if the level cannot be initialized.
#[must_use]
pub fn started_level(config: ArenaConfig) -> Simulation {
    let mut sim = Simulation::new(config);
    sim.initialize_level().expect("level init");
    sim.start_game().expect("game start");
    sim
}
