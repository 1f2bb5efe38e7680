//! Scripted player strategies for headless matches.
//!
//! A strategy looks at the simulation before each tick and decides what the
//! virtual joystick does. Strategies only read public simulation state, so a
//! match stays fully determined by its seed and strategy.

use arena_core::combat;
use arena_core::prelude::*;
use arena_core::targeting::{find_nearest_target, TargetQuery};
use serde::{Deserialize, Serialize};

/// How the scripted player behaves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStrategy {
    /// Never touches the stick.
    Idle,
    /// Walks at the nearest combatant and throws whenever an opponent is in range.
    #[default]
    Hunter,
    /// Backs away from the nearest combatant, throwing when ready.
    Kiter,
}

impl PlayerStrategy {
    /// Input for the next tick.
    #[must_use]
    pub fn decide(self, sim: &Simulation) -> PlayerInput {
        let Some(player) = sim
            .player()
            .and_then(|id| sim.combatant(id))
            .filter(|p| p.is_alive())
        else {
            return PlayerInput::Idle;
        };

        match self {
            Self::Idle => PlayerInput::Idle,
            Self::Hunter if ready_to_throw(sim, player) => PlayerInput::Release,
            Self::Hunter => toward_nearest(sim, player).map_or(PlayerInput::Idle, PlayerInput::Move),
            Self::Kiter if ready_to_throw(sim, player) => PlayerInput::Release,
            Self::Kiter => toward_nearest(sim, player)
                .map_or(PlayerInput::Idle, |direction| PlayerInput::Move(-direction)),
        }
    }

    /// Lowercase name, as accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Hunter => "hunter",
            Self::Kiter => "kiter",
        }
    }
}

fn ready_to_throw(sim: &Simulation, player: &Combatant) -> bool {
    combat::can_attack(player, sim.now() + sim.tick_delta())
        && find_nearest_target(sim.combatants(), &TargetQuery::opponents_of(player)).is_some()
}

fn toward_nearest(sim: &Simulation, player: &Combatant) -> Option<Vec2Fixed> {
    let target = find_nearest_target(sim.combatants(), &TargetQuery::anyone_but(player))?;
    let offset = sim.combatant(target)?.position - player.position;
    (offset != Vec2Fixed::ZERO).then(|| offset.normalize())
}
