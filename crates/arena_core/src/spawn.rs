//! Spawn director: bot population, replacement spawns and the win condition.

use crate::components::EntityId;
use crate::config::SpawnConfig;
use crate::error::{ArenaError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::navigation::Navigation;
use crate::rng::SimRng;

/// Placement for the opening wave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavePlan {
    /// Player spawn point.
    pub player: Vec2Fixed,
    /// Bot spawn points, all distinct from each other and the player's.
    pub bots: Vec<Vec2Fixed>,
}

/// Tracks the active bots and how many have been spawned this level.
#[derive(Debug, Clone)]
pub struct SpawnDirector {
    config: SpawnConfig,
    spawn_points: Vec<Vec2Fixed>,
    active_bots: Vec<EntityId>,
    spawned_count: u32,
}

impl SpawnDirector {
    /// Create a director over the given spawn points.
    #[must_use]
    pub fn new(config: SpawnConfig, spawn_points: Vec<Vec2Fixed>) -> Self {
        Self {
            config,
            spawn_points,
            active_bots: Vec::new(),
            spawned_count: 0,
        }
    }

    /// Forget all bots and counters.
    pub fn reset(&mut self) {
        self.active_bots.clear();
        self.spawned_count = 0;
    }

    /// Spawn points needed for the player plus one wave.
    #[must_use]
    pub fn required_points(&self) -> usize {
        self.config.bots_per_wave as usize + 1
    }

    /// Check that the layout can host the opening wave.
    pub fn check_spawn_points(&self) -> Result<()> {
        let required = self.required_points();
        let available = self.spawn_points.len();
        if available < required {
            return Err(ArenaError::InsufficientSpawnPoints {
                required,
                available,
            });
        }
        Ok(())
    }

    /// Shuffle the spawn points and assign the opening wave.
    ///
    /// The wave never exceeds the level's bot cap.
    pub fn plan_wave(&self, rng: &mut SimRng) -> Result<WavePlan> {
        self.check_spawn_points()?;
        let mut points = self.spawn_points.clone();
        rng.shuffle(&mut points);

        let wave = self.config.bots_per_wave.min(self.config.max_total_bots) as usize;
        Ok(WavePlan {
            player: points[0],
            bots: points[1..=wave].to_vec(),
        })
    }

    /// Whether another bot may be spawned this level.
    #[must_use]
    pub fn can_spawn(&self) -> bool {
        self.spawned_count < self.config.max_total_bots
    }

    /// Register a freshly spawned bot.
    pub fn record_spawn(&mut self, bot: EntityId) {
        self.active_bots.push(bot);
        self.spawned_count += 1;
    }

    /// Remove a bot from the registry. Returns `false` if it was not registered.
    pub fn remove(&mut self, bot: EntityId) -> bool {
        let before = self.active_bots.len();
        self.active_bots.retain(|&b| b != bot);
        self.active_bots.len() != before
    }

    /// Random spawn point for a replacement bot, if the cap allows one.
    pub fn replacement_point(&self, rng: &mut SimRng) -> Option<Vec2Fixed> {
        if !self.can_spawn() {
            return None;
        }
        rng.index(self.spawn_points.len()).map(|i| self.spawn_points[i])
    }

    /// Every bot has been spawned and none remain.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.active_bots.is_empty() && self.spawned_count >= self.config.max_total_bots
    }

    /// Registered bots, in spawn order.
    #[must_use]
    pub fn active_bots(&self) -> &[EntityId] {
        &self.active_bots
    }

    /// Bots spawned this level.
    #[must_use]
    pub const fn spawned_count(&self) -> u32 {
        self.spawned_count
    }

    /// Remaining bots: registered plus not yet spawned.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.active_bots.len() as u32 + self.config.max_total_bots.saturating_sub(self.spawned_count)
    }
}

/// Check that no occupant overlaps a circle of `radius` around `position`.
///
/// Occupants are `(position, body radius)` pairs.
#[must_use]
pub fn is_position_clear(position: Vec2Fixed, radius: Fixed, occupants: &[(Vec2Fixed, Fixed)]) -> bool {
    occupants.iter().all(|&(center, body)| {
        let reach = radius + body;
        position.distance_squared(center) >= reach * reach
    })
}

/// Find a spawn position near `preferred` that is free of occupants.
///
/// Tries the preferred point, then random offsets snapped to the navigable
/// surface. Falls back to the unchecked preferred point.
pub fn find_clear_position(
    preferred: Vec2Fixed,
    occupants: &[(Vec2Fixed, Fixed)],
    config: &SpawnConfig,
    navigation: &dyn Navigation,
    rng: &mut SimRng,
) -> Vec2Fixed {
    if is_position_clear(preferred, config.clearance_radius, occupants) {
        return preferred;
    }

    for _ in 0..config.clear_search_attempts {
        let offset = rng.point_in_unit_disc().scale(config.clear_search_radius);
        let Some(candidate) =
            navigation.sample_position(preferred + offset, config.clear_search_radius)
        else {
            continue;
        };
        if is_position_clear(candidate, config.clearance_radius, occupants) {
            return candidate;
        }
    }

    tracing::warn!(?preferred, "No clear spawn position found, using preferred point");
    preferred
}
