//! Outbound notifications.
//!
//! The simulation never talks to presentation, audio, the economy or the
//! level orchestrator directly. Everything those collaborators care about
//! is reported as a [`SimEvent`] and returned from
//! [`Simulation::tick`](crate::simulation::Simulation::tick).

use serde::{Deserialize, Serialize};

use crate::components::{Animation, EntityId, WeaponKind};
use crate::math::Vec2Fixed;

/// Named sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// A weapon was thrown.
    Attack,
    /// A combatant died.
    Death,
    /// The level was lost.
    Fail,
    /// The level was won.
    Victory,
}

/// Why coins were awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinReason {
    /// A dead bot was cleaned up.
    BotDefeated,
    /// The level was won.
    Victory,
}

/// Why a projectile left the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DespawnReason {
    /// Reached its maximum travel distance.
    Expired,
    /// Struck an obstacle.
    Blocked,
    /// Struck a combatant.
    Hit,
    /// Its owner died.
    OwnerDied,
    /// The level was reset.
    LevelReset,
}

/// A single notification emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A combatant switched animation.
    AnimationChanged {
        /// Combatant.
        entity: EntityId,
        /// New animation.
        animation: Animation,
    },
    /// A sound should play.
    SoundPlayed(SoundCue),
    /// Coins were earned.
    CoinsAwarded {
        /// Coin count.
        amount: u32,
        /// Reason for the award.
        reason: CoinReason,
    },
    /// A combatant died.
    CombatantKilled {
        /// Projectile owner credited with the kill, if any.
        killer: Option<EntityId>,
        /// The dead combatant.
        victim: EntityId,
    },
    /// A killer grew after a confirmed kill.
    GrowthUpdated {
        /// Combatant that grew.
        entity: EntityId,
        /// Kills after the update.
        kill_count: u32,
    },
    /// A weapon was thrown.
    ProjectileLaunched {
        /// Projectile id.
        projectile: EntityId,
        /// Thrower.
        owner: EntityId,
        /// Weapon kind.
        weapon: WeaponKind,
        /// Launch point.
        origin: Vec2Fixed,
        /// Unit flight direction.
        direction: Vec2Fixed,
    },
    /// A projectile left the field.
    ProjectileDespawned {
        /// Projectile id.
        projectile: EntityId,
        /// Why it left.
        reason: DespawnReason,
    },
    /// The weapon in a combatant's hand was hidden or shown.
    WeaponVisibility {
        /// Combatant.
        entity: EntityId,
        /// Whether the weapon is now visible.
        visible: bool,
    },
    /// A bot entered the field.
    BotSpawned {
        /// Bot id.
        bot: EntityId,
        /// Spawn position.
        position: Vec2Fixed,
    },
    /// A dead bot was returned to its pool.
    BotDespawned {
        /// Bot id.
        bot: EntityId,
    },
    /// The player died while the level was in play.
    PlayerDefeated,
    /// Every bot was defeated.
    LevelWon,
}

/// Events produced during one simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Tick number the events belong to.
    pub tick: u64,
    /// Events in emission order.
    pub events: Vec<SimEvent>,
}

impl TickEvents {
    /// Check whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over kills as `(killer, victim)` pairs.
    pub fn kills(&self) -> impl Iterator<Item = (Option<EntityId>, EntityId)> + '_ {
        self.events.iter().filter_map(|e| match e {
            SimEvent::CombatantKilled { killer, victim } => Some((*killer, *victim)),
            _ => None,
        })
    }

    /// Iterate over despawned projectiles.
    pub fn despawned_projectiles(&self) -> impl Iterator<Item = (EntityId, DespawnReason)> + '_ {
        self.events.iter().filter_map(|e| match e {
            SimEvent::ProjectileDespawned { projectile, reason } => Some((*projectile, *reason)),
            _ => None,
        })
    }

    /// Total coins awarded this tick.
    #[must_use]
    pub fn coins(&self) -> u32 {
        self.events
            .iter()
            .map(|e| match e {
                SimEvent::CoinsAwarded { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// Check whether a sound cue was played.
    #[must_use]
    pub fn played(&self, cue: SoundCue) -> bool {
        self.events.contains(&SimEvent::SoundPlayed(cue))
    }
}
