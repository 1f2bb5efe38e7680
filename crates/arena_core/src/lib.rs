//! # Arena Core
//!
//! Deterministic simulation core for a last-one-standing throwing arena.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No audio
//! - No system randomness (one seeded source per simulation)
//! - No floating-point math (uses fixed-point)
//!
//! Presentation, audio, the coin economy and the level UI are driven by
//! the [`events::SimEvent`]s returned from each tick.
//!
//! ## Crate Structure
//!
//! - [`components`] - Combatant model and identifiers
//! - [`targeting`] - Nearest-target queries
//! - [`combat`] - Attack gating
//! - [`projectile`] - Thrown weapons in flight
//! - [`behavior`] - Bot state machine
//! - [`spawn`] - Spawn director and win condition
//! - [`simulation`] - Core simulation loop
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod behavior;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod math;
pub mod navigation;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod rng;
pub mod scheduler;
pub mod simulation;
pub mod spawn;
pub mod targeting;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::behavior::{BehaviorKind, BehaviorState, PatrolPhase};
    pub use crate::components::*;
    pub use crate::config::{ArenaConfig, ConfigError};
    pub use crate::error::{ArenaError, Result};
    pub use crate::events::{DespawnReason, SimEvent, SoundCue, TickEvents};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::player::PlayerInput;
    pub use crate::simulation::{GamePhase, Simulation};
}
