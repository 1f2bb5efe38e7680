//! Entity pooling.
//!
//! Combatants and projectiles are drawn from bounded pools and returned on
//! despawn. The [`EntityPool`] trait is the seam; [`SlotPool`] is the
//! built-in implementation with generational slot reuse.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::components::{EntityId, WeaponKind};
use crate::config::PoolConfig;

/// Pool categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PoolKind {
    /// The single player.
    Player,
    /// Bots.
    Bot,
    /// Thrown weapons, one pool per kind.
    Projectile(WeaponKind),
}

/// Spawns and reclaims pooled entities.
pub trait EntityPool: Debug {
    /// Take an entity from the pool. Returns `None` when the pool is exhausted.
    fn spawn(&mut self, kind: PoolKind) -> Option<EntityId>;

    /// Return an entity. Returns `false` if it was not active.
    fn despawn(&mut self, id: EntityId) -> bool;

    /// Return every active entity.
    fn collect_all(&mut self);

    /// Active entities of a kind.
    fn active_count(&self, kind: PoolKind) -> usize;
}

#[derive(Debug, Clone)]
struct Slot {
    kind: PoolKind,
    generation: u32,
    active: bool,
}

/// Generational slot pool with per-kind capacity.
#[derive(Debug, Clone)]
pub struct SlotPool {
    slots: Vec<Slot>,
    free: BTreeMap<PoolKind, Vec<u32>>,
    capacity: BTreeMap<PoolKind, usize>,
}

impl SlotPool {
    /// Create a pool with the given capacities. The player pool holds one.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        let mut capacity = BTreeMap::new();
        capacity.insert(PoolKind::Player, 1);
        capacity.insert(PoolKind::Bot, config.bot_capacity as usize);
        for weapon in WeaponKind::ALL {
            capacity.insert(
                PoolKind::Projectile(weapon),
                config.projectile_capacity as usize,
            );
        }
        Self {
            slots: Vec::new(),
            free: BTreeMap::new(),
            capacity,
        }
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.slot() as usize)
            .filter(|slot| slot.generation == id.generation())
    }
}

impl EntityPool for SlotPool {
    fn spawn(&mut self, kind: PoolKind) -> Option<EntityId> {
        let limit = self.capacity.get(&kind).copied().unwrap_or(0);
        if self.active_count(kind) >= limit {
            tracing::warn!(?kind, limit, "Pool exhausted");
            return None;
        }

        if let Some(index) = self.free.get_mut(&kind).and_then(Vec::pop) {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.active = true;
            return Some(EntityId::new(index, slot.generation));
        }

        let index = u32::try_from(self.slots.len()).ok()?;
        self.slots.push(Slot {
            kind,
            generation: 0,
            active: true,
        });
        Some(EntityId::new(index, 0))
    }

    fn despawn(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        if !slot.active {
            return false;
        }
        slot.active = false;
        let kind = slot.kind;
        self.free.entry(kind).or_default().push(id.slot());
        true
    }

    fn collect_all(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.active {
                slot.active = false;
                self.free.entry(slot.kind).or_default().push(index as u32);
            }
        }
    }

    fn active_count(&self, kind: PoolKind) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.active && slot.kind == kind)
            .count()
    }
}
