//! Entity model shared by every combatant.
//!
//! A [`Combatant`] is either the player or a bot. Both carry the same
//! attributes (position, facing, alive flag, range, cooldown, growth);
//! bots additionally own a [`BotBrain`] holding their behavior state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::behavior::BotBrain;
use crate::config::CombatantConfig;
use crate::math::{decimal_serde, Fixed, Vec2Fixed};

/// Unique identifier for pooled entities.
///
/// Packs a pool slot and the slot's generation, so an id handed out before
/// a slot was recycled never matches the slot's new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Build an id from a pool slot and generation.
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | slot as u64)
    }

    /// Pool slot index.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.0 as u32
    }

    /// Generation of the slot when this id was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw packed value.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot(), self.generation())
    }
}

/// Collision layers used by target filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u8);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// The player layer.
    pub const PLAYER: Self = Self(1);
    /// The bot layer.
    pub const BOT: Self = Self(1 << 1);
    /// Every combatant layer.
    pub const ALL: Self = Self(Self::PLAYER.0 | Self::BOT.0);

    /// Check whether any layer in `other` is part of this mask.
    #[must_use]
    pub const fn matches(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Combine two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Which side of the game a combatant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantKind {
    /// The human-controlled character.
    Player,
    /// An AI-controlled character.
    Bot,
}

impl CombatantKind {
    /// Collision layer of this kind.
    #[must_use]
    pub const fn layer(self) -> LayerMask {
        match self {
            Self::Player => LayerMask::PLAYER,
            Self::Bot => LayerMask::BOT,
        }
    }
}

/// Throwable weapon kinds. Each kind has its own projectile pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum WeaponKind {
    /// Balanced default weapon.
    #[default]
    Axe,
    /// Fast, short-lived.
    Knife,
    /// Slow, long reach.
    Hammer,
}

impl WeaponKind {
    /// Every weapon kind.
    pub const ALL: [Self; 3] = [Self::Axe, Self::Knife, Self::Hammer];
}

/// Animation names understood by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    /// Standing still.
    Idle,
    /// Running.
    Run,
    /// Throwing.
    Attack,
    /// Dying.
    Dead,
    /// Celebrating a won level.
    Win,
}

impl Animation {
    /// Animation trigger name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Attack => "attack",
            Self::Dead => "dead",
            Self::Win => "win",
        }
    }
}

/// Base values and per-kill increments for size and range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Growth {
    /// Size with zero kills.
    #[serde(with = "decimal_serde")]
    pub base_size: Fixed,
    /// Range with zero kills.
    #[serde(with = "decimal_serde")]
    pub base_range: Fixed,
    /// Size added per kill.
    #[serde(with = "decimal_serde")]
    pub size_per_kill: Fixed,
    /// Range added per kill.
    #[serde(with = "decimal_serde")]
    pub range_per_kill: Fixed,
}

impl Growth {
    fn from_config(config: &CombatantConfig) -> Self {
        Self {
            base_size: config.base_size,
            base_range: config.base_range,
            size_per_kill: config.size_growth_per_kill,
            range_per_kill: config.range_growth_per_kill,
        }
    }

    /// Size after `kills` kills.
    #[must_use]
    pub fn size_at(&self, kills: u32) -> Fixed {
        self.base_size + self.size_per_kill * Fixed::from_num(kills)
    }

    /// Range after `kills` kills.
    #[must_use]
    pub fn range_at(&self, kills: u32) -> Fixed {
        self.base_range + self.range_per_kill * Fixed::from_num(kills)
    }
}

/// A player or bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    /// Pool-issued identifier.
    pub id: EntityId,
    /// Player or bot.
    pub kind: CombatantKind,
    /// Ground-plane position.
    pub position: Vec2Fixed,
    /// Unit facing direction on the ground plane.
    pub facing: Vec2Fixed,
    /// Movement speed in units per second.
    pub move_speed: Fixed,
    /// Collision radius at size 1.
    pub body_radius: Fixed,
    /// Minimum seconds between attacks.
    pub attack_cooldown: Fixed,
    /// Layers this combatant attacks.
    pub target_layers: LayerMask,
    /// Weapon thrown by this combatant.
    pub weapon: WeaponKind,
    /// Whether the weapon is visible in hand (hidden while one is in flight).
    pub weapon_in_hand: bool,
    /// Behavior state, present for bots only.
    pub brain: Option<BotBrain>,
    alive: bool,
    size: Fixed,
    range: Fixed,
    kill_count: u32,
    last_attack_time: Fixed,
    growth: Growth,
    animation: Option<Animation>,
    active_projectiles: Vec<EntityId>,
}

impl Combatant {
    /// Create an initialized combatant.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: CombatantKind,
        position: Vec2Fixed,
        config: &CombatantConfig,
    ) -> Self {
        let mut combatant = Self {
            id,
            kind,
            position,
            facing: Vec2Fixed::new(Fixed::ZERO, Fixed::ONE),
            move_speed: config.move_speed,
            body_radius: config.body_radius,
            attack_cooldown: config.attack_cooldown,
            target_layers: config.target_layers,
            weapon: config.weapon,
            weapon_in_hand: true,
            brain: match kind {
                CombatantKind::Bot => Some(BotBrain::default()),
                CombatantKind::Player => None,
            },
            alive: true,
            size: config.base_size,
            range: config.base_range,
            kill_count: 0,
            last_attack_time: Fixed::ZERO,
            growth: Growth::from_config(config),
            animation: None,
            active_projectiles: Vec::new(),
        };
        combatant.reset();
        combatant
    }

    /// Restore spawn-time values, as when drawn from the pool.
    ///
    /// The last attack time is set one cooldown in the past so a fresh
    /// combatant may attack immediately.
    pub fn reset(&mut self) {
        self.alive = true;
        self.kill_count = 0;
        self.size = self.growth.base_size;
        self.range = self.growth.base_range;
        self.last_attack_time = -self.attack_cooldown;
        self.weapon_in_hand = true;
        self.active_projectiles.clear();
        if let Some(brain) = self.brain.as_mut() {
            *brain = BotBrain::default();
        }
    }

    /// Collision layer of this combatant.
    #[must_use]
    pub const fn layer(&self) -> LayerMask {
        self.kind.layer()
    }

    /// Whether the combatant is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the combatant is a bot.
    #[must_use]
    pub const fn is_bot(&self) -> bool {
        matches!(self.kind, CombatantKind::Bot)
    }

    /// Current size scale.
    #[must_use]
    pub const fn size(&self) -> Fixed {
        self.size
    }

    /// Current attack range.
    #[must_use]
    pub const fn range(&self) -> Fixed {
        self.range
    }

    /// Confirmed kills this life.
    #[must_use]
    pub const fn kill_count(&self) -> u32 {
        self.kill_count
    }

    /// Simulation time of the last attack.
    #[must_use]
    pub const fn last_attack_time(&self) -> Fixed {
        self.last_attack_time
    }

    /// Growth parameters.
    #[must_use]
    pub const fn growth(&self) -> &Growth {
        &self.growth
    }

    /// Current animation, if any was set.
    #[must_use]
    pub const fn animation(&self) -> Option<Animation> {
        self.animation
    }

    /// Projectiles launched by this combatant that are still in flight.
    #[must_use]
    pub fn active_projectiles(&self) -> &[EntityId] {
        &self.active_projectiles
    }

    /// Collision radius scaled by size.
    #[must_use]
    pub fn hit_radius(&self) -> Fixed {
        self.body_radius * self.size
    }

    /// Distance to a point.
    #[must_use]
    pub fn distance_to(&self, point: Vec2Fixed) -> Fixed {
        self.position.distance(point)
    }

    /// Record that an attack happened at `now`.
    pub fn stamp_attack(&mut self, now: Fixed) {
        self.last_attack_time = now;
    }

    /// Credit one confirmed kill and recompute size and range.
    pub fn record_kill(&mut self) {
        self.kill_count += 1;
        self.size = self.growth.size_at(self.kill_count);
        self.range = self.growth.range_at(self.kill_count);
    }

    /// Mark the combatant dead.
    ///
    /// Returns `false` if it was already dead, making death idempotent.
    pub fn mark_dead(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        true
    }

    /// Turn to face a point, ignoring height.
    pub fn face_toward(&mut self, point: Vec2Fixed) {
        self.face_along(point - self.position);
    }

    /// Turn to face along a direction; a zero direction keeps the facing.
    pub fn face_along(&mut self, direction: Vec2Fixed) {
        if !direction.is_zero() {
            self.facing = direction.normalize();
        }
    }

    /// Switch animation. Returns `false` if it was already playing.
    pub fn set_animation(&mut self, animation: Animation) -> bool {
        if self.animation == Some(animation) {
            return false;
        }
        self.animation = Some(animation);
        true
    }

    /// Track a launched projectile.
    pub fn register_projectile(&mut self, projectile: EntityId) {
        if !self.active_projectiles.contains(&projectile) {
            self.active_projectiles.push(projectile);
        }
    }

    /// Stop tracking a projectile.
    pub fn unregister_projectile(&mut self, projectile: EntityId) {
        self.active_projectiles.retain(|&p| p != projectile);
    }

    /// Remove and return every tracked projectile.
    pub fn take_projectiles(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.active_projectiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> Combatant {
        Combatant::new(
            EntityId::new(1, 0),
            CombatantKind::Bot,
            Vec2Fixed::ZERO,
            &CombatantConfig::default(),
        )
    }

    #[test]
    fn test_entity_id_packs_slot_and_generation() {
        let id = EntityId::new(7, 3);
        assert_eq!(id.slot(), 7);
        assert_eq!(id.generation(), 3);
        assert_ne!(id, EntityId::new(7, 4));
        assert_eq!(id.to_string(), "7v3");
    }

    #[test]
    fn test_layer_mask_matching() {
        assert!(LayerMask::ALL.matches(LayerMask::BOT));
        assert!(LayerMask::ALL.matches(LayerMask::PLAYER));
        assert!(!LayerMask::PLAYER.matches(LayerMask::BOT));
        assert!(!LayerMask::NONE.matches(LayerMask::ALL));
        assert_eq!(LayerMask::PLAYER.union(LayerMask::BOT), LayerMask::ALL);
    }

    #[test]
    fn test_new_combatant_can_attack_immediately() {
        let c = bot();
        assert!(c.is_alive());
        assert_eq!(c.last_attack_time(), -Fixed::from_num(2));
        assert_eq!(c.range(), Fixed::from_num(7));
        assert_eq!(c.size(), Fixed::ONE);
        assert!(c.brain.is_some());
    }

    #[test]
    fn test_record_kill_applies_growth_formula() {
        let mut c = bot();
        c.record_kill();
        c.record_kill();
        assert_eq!(c.kill_count(), 2);
        assert_eq!(c.range(), Fixed::from_num(9));
        assert_eq!(c.size(), Fixed::ONE + Fixed::from_num(0.2) * Fixed::from_num(2));
        assert_eq!(c.range(), c.growth().range_at(c.kill_count()));
        assert_eq!(c.size(), c.growth().size_at(2));
    }

    #[test]
    fn test_distance_to_ignores_own_size() {
        let mut c = bot();
        c.record_kill();
        assert_eq!(c.distance_to(c.position), Fixed::ZERO);
        let d = c.distance_to(c.position + Vec2Fixed::from_ints(3, 4));
        assert!((d - Fixed::from_num(5)).abs() < Fixed::from_num(0.001));
    }

    #[test]
    fn test_mark_dead_is_idempotent() {
        let mut c = bot();
        assert!(c.mark_dead());
        assert!(!c.mark_dead());
        assert!(!c.is_alive());
    }

    #[test]
    fn test_reset_restores_spawn_values() {
        let mut c = bot();
        c.record_kill();
        c.mark_dead();
        c.register_projectile(EntityId::new(9, 0));
        c.reset();
        assert!(c.is_alive());
        assert_eq!(c.kill_count(), 0);
        assert_eq!(c.range(), Fixed::from_num(7));
        assert!(c.active_projectiles().is_empty());
    }

    #[test]
    fn test_face_toward_ignores_zero_direction() {
        let mut c = bot();
        c.face_toward(Vec2Fixed::from_ints(10, 0));
        assert_eq!(c.facing, Vec2Fixed::from_ints(1, 0));
        c.face_toward(c.position);
        assert_eq!(c.facing, Vec2Fixed::from_ints(1, 0));
    }

    #[test]
    fn test_set_animation_is_idempotent() {
        let mut c = bot();
        assert!(c.set_animation(Animation::Run));
        assert!(!c.set_animation(Animation::Run));
        assert!(c.set_animation(Animation::Idle));
        assert_eq!(c.animation(), Some(Animation::Idle));
    }

    #[test]
    fn test_projectile_registration() {
        let mut c = bot();
        let p = EntityId::new(3, 0);
        c.register_projectile(p);
        c.register_projectile(p);
        assert_eq!(c.active_projectiles(), &[p]);
        c.unregister_projectile(p);
        assert!(c.active_projectiles().is_empty());
    }
}
