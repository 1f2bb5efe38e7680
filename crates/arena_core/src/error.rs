//! Error types for the arena simulation.

use thiserror::Error;

use crate::components::EntityId;

/// Result type alias using [`ArenaError`].
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Top-level error type for arena simulation errors.
///
/// Nothing inside a simulation tick returns these: missing targets, a full
/// pool or a crowded spawn point are ordinary branches. Errors surface only
/// from setup and from explicit external requests.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The level layout cannot host the requested wave.
    #[error("Not enough spawn points: need {required}, have {available}")]
    InsufficientSpawnPoints {
        /// Spawn points required (player + initial wave).
        required: usize,
        /// Spawn points configured.
        available: usize,
    },

    /// Configuration value rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid game state for the requested operation.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
