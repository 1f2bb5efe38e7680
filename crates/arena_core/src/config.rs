//! Arena configuration.
//!
//! Every tunable of the simulation lives in [`ArenaConfig`]. Configurations
//! are plain data loaded from RON files; decimal values are written as
//! ordinary numbers and converted to fixed-point on load.
//!
//! # Example RON
//!
//! ```ron
//! ArenaConfig(
//!     tick_rate: 20,
//!     seed: 42,
//!     spawn: SpawnConfig(
//!         max_total_bots: 10,
//!         bots_per_wave: 5,
//!         clearance_radius: 1.0,
//!         clear_search_attempts: 10,
//!         clear_search_radius: 5.0,
//!         despawn_delay: 1.5,
//!     ),
//! )
//! ```
//!
//! Omitted sections fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{LayerMask, WeaponKind};
use crate::math::{decimal_serde, Fixed, Vec2Fixed};

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed values are inconsistent.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Inclusive `[min, max]` range for randomized durations and distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedRange {
    /// Lower bound.
    #[serde(with = "decimal_serde")]
    pub min: Fixed,
    /// Upper bound.
    #[serde(with = "decimal_serde")]
    pub max: Fixed,
}

impl FixedRange {
    /// Create a range from decimal bounds.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Fixed::from_num(min),
            max: Fixed::from_num(max),
        }
    }

    /// Check whether a value lies inside the range.
    #[must_use]
    pub fn contains(&self, value: Fixed) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_valid(&self) -> bool {
        self.min >= Fixed::ZERO && self.min <= self.max
    }
}

/// Stats shared by every combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantConfig {
    /// Size at spawn.
    #[serde(with = "decimal_serde")]
    pub base_size: Fixed,
    /// Attack range at spawn.
    #[serde(with = "decimal_serde")]
    pub base_range: Fixed,
    /// Size gained per confirmed kill.
    #[serde(with = "decimal_serde")]
    pub size_growth_per_kill: Fixed,
    /// Range gained per confirmed kill.
    #[serde(with = "decimal_serde")]
    pub range_growth_per_kill: Fixed,
    /// Minimum seconds between attacks.
    #[serde(with = "decimal_serde")]
    pub attack_cooldown: Fixed,
    /// Movement speed in units per second.
    #[serde(with = "decimal_serde")]
    pub move_speed: Fixed,
    /// Collision radius at size 1.
    #[serde(with = "decimal_serde")]
    pub body_radius: Fixed,
    /// Seconds before a thrown weapon reappears in hand.
    #[serde(with = "decimal_serde")]
    pub weapon_reshow_delay: Fixed,
    /// Layers this combatant considers opponents.
    pub target_layers: LayerMask,
    /// Weapon thrown by default.
    pub weapon: WeaponKind,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self {
            base_size: Fixed::ONE,
            base_range: Fixed::from_num(7),
            size_growth_per_kill: Fixed::from_num(0.2),
            range_growth_per_kill: Fixed::ONE,
            attack_cooldown: Fixed::from_num(2),
            move_speed: Fixed::from_num(5),
            body_radius: Fixed::from_num(0.5),
            weapon_reshow_delay: Fixed::from_num(0.5),
            target_layers: LayerMask::ALL,
            weapon: WeaponKind::Axe,
        }
    }
}

/// Flight stats for one weapon kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Weapon kind these stats apply to.
    pub kind: WeaponKind,
    /// Flight speed in units per second.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,
    /// Distance after which the projectile expires.
    #[serde(with = "decimal_serde")]
    pub max_distance: Fixed,
    /// Collision radius of the projectile.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
}

impl WeaponConfig {
    /// Default stats for a weapon kind.
    #[must_use]
    pub fn standard(kind: WeaponKind) -> Self {
        let (speed, max_distance, radius) = match kind {
            WeaponKind::Axe => (15.0, 20.0, 0.3),
            WeaponKind::Knife => (18.0, 18.0, 0.2),
            WeaponKind::Hammer => (12.0, 22.0, 0.4),
        };
        Self {
            kind,
            speed: Fixed::from_num(speed),
            max_distance: Fixed::from_num(max_distance),
            radius: Fixed::from_num(radius),
        }
    }
}

/// Patrol behavior timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Seconds spent idling.
    pub idle_duration: FixedRange,
    /// Seconds spent moving before idling again.
    pub move_duration: FixedRange,
    /// Seconds spent preparing before attacking.
    pub prepare_duration: FixedRange,
    /// Probability of running at the target while preparing.
    #[serde(with = "decimal_serde")]
    pub keep_moving_chance: Fixed,
    /// Distance of a random wander point from the bot.
    pub wander_distance: FixedRange,
    /// Search radius used to snap wander points to the navigable surface.
    #[serde(with = "decimal_serde")]
    pub wander_sample_radius: Fixed,
    /// Distance under which the destination counts as reached.
    #[serde(with = "decimal_serde")]
    pub arrival_threshold: Fixed,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            idle_duration: FixedRange::new(1.0, 3.0),
            move_duration: FixedRange::new(2.0, 5.0),
            prepare_duration: FixedRange::new(1.0, 2.0),
            keep_moving_chance: Fixed::from_num(0.5),
            wander_distance: FixedRange::new(5.0, 15.0),
            wander_sample_radius: Fixed::from_num(15),
            arrival_threshold: Fixed::from_num(0.1),
        }
    }
}

/// Attack behavior timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Seconds between target re-checks.
    #[serde(with = "decimal_serde")]
    pub target_check_interval: Fixed,
    /// Probability of lingering after a throw.
    #[serde(with = "decimal_serde")]
    pub linger_chance: Fixed,
    /// Linger duration when lingering.
    pub linger_duration: FixedRange,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            target_check_interval: Fixed::from_num(0.3),
            linger_chance: Fixed::from_num(0.5),
            linger_duration: FixedRange::new(1.0, 2.0),
        }
    }
}

/// Population rules for the spawn director.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Bots spawned over the whole level.
    pub max_total_bots: u32,
    /// Bots placed by the initial wave.
    pub bots_per_wave: u32,
    /// Radius that must be free of combatants for a spawn point to be clear.
    #[serde(with = "decimal_serde")]
    pub clearance_radius: Fixed,
    /// Random offsets tried before falling back to the preferred point.
    pub clear_search_attempts: u32,
    /// Maximum offset from the preferred point.
    #[serde(with = "decimal_serde")]
    pub clear_search_radius: Fixed,
    /// Seconds between a bot's death and its despawn.
    #[serde(with = "decimal_serde")]
    pub despawn_delay: Fixed,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_total_bots: 10,
            bots_per_wave: 5,
            clearance_radius: Fixed::ONE,
            clear_search_attempts: 10,
            clear_search_radius: Fixed::from_num(5),
            despawn_delay: Fixed::from_num(1.5),
        }
    }
}

/// Player controller timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Seconds after a throw before the player idles again.
    #[serde(with = "decimal_serde")]
    pub attack_animation_time: Fixed,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            attack_animation_time: Fixed::from_num(0.5),
        }
    }
}

/// Coin awards reported to the economy collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Coins per despawned bot.
    pub coins_per_bot: u32,
    /// Coins for winning the level.
    pub coins_on_victory: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            coins_per_bot: 1,
            coins_on_victory: 5,
        }
    }
}

/// Pool capacities for the built-in slot pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Bots alive at once, dead bodies included.
    pub bot_capacity: u32,
    /// Projectiles in flight per weapon kind.
    pub projectile_capacity: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            bot_capacity: 16,
            projectile_capacity: 64,
        }
    }
}

/// Circular obstacle that blocks projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Center on the ground plane.
    pub center: Vec2Fixed,
    /// Blocking radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
}

/// Static level geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaLayout {
    /// Minimum corner of the navigable rectangle.
    pub bounds_min: Vec2Fixed,
    /// Maximum corner of the navigable rectangle.
    pub bounds_max: Vec2Fixed,
    /// Candidate spawn points.
    pub spawn_points: Vec<Vec2Fixed>,
    /// Projectile-blocking obstacles.
    pub obstacles: Vec<Obstacle>,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        let spawn_points = [
            (-20, -20),
            (0, -22),
            (20, -20),
            (22, 0),
            (20, 20),
            (0, 22),
            (-20, 20),
            (-22, 0),
            (-10, -10),
            (10, -10),
            (10, 10),
            (-10, 10),
        ]
        .into_iter()
        .map(|(x, y)| Vec2Fixed::from_ints(x, y))
        .collect();

        let obstacles = [(-12, 0), (12, 0), (0, 12), (0, -12)]
            .into_iter()
            .map(|(x, y)| Obstacle {
                center: Vec2Fixed::from_ints(x, y),
                radius: Fixed::from_num(1.5),
            })
            .collect();

        Self {
            bounds_min: Vec2Fixed::from_ints(-30, -30),
            bounds_max: Vec2Fixed::from_ints(30, 30),
            spawn_points,
            obstacles,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Seed for the simulation's random source.
    pub seed: u64,
    /// Shared combatant stats.
    pub combatant: CombatantConfig,
    /// Flight stats per weapon kind.
    pub weapons: Vec<WeaponConfig>,
    /// Patrol timings.
    pub patrol: PatrolConfig,
    /// Attack timings.
    pub attack: AttackConfig,
    /// Spawn rules.
    pub spawn: SpawnConfig,
    /// Player controller timings.
    pub player: PlayerConfig,
    /// Coin awards.
    pub rewards: RewardConfig,
    /// Pool capacities.
    pub pool: PoolConfig,
    /// Level geometry.
    pub layout: ArenaLayout,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            seed: 0,
            combatant: CombatantConfig::default(),
            weapons: WeaponKind::ALL
                .into_iter()
                .map(WeaponConfig::standard)
                .collect(),
            patrol: PatrolConfig::default(),
            attack: AttackConfig::default(),
            spawn: SpawnConfig::default(),
            player: PlayerConfig::default(),
            rewards: RewardConfig::default(),
            pool: PoolConfig::default(),
            layout: ArenaLayout::default(),
        }
    }
}

impl ArenaConfig {
    /// Load and validate a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse and validate a configuration from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style seed override.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Duration of one tick in seconds.
    #[must_use]
    pub fn tick_delta(&self) -> Fixed {
        Fixed::ONE / Fixed::from_num(self.tick_rate.max(1))
    }

    /// Flight stats for a weapon kind.
    #[must_use]
    pub fn weapon(&self, kind: WeaponKind) -> WeaponConfig {
        self.weapons
            .iter()
            .find(|w| w.kind == kind)
            .copied()
            .unwrap_or_else(|| WeaponConfig::standard(kind))
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }

        let ranges = [
            ("patrol.idle_duration", self.patrol.idle_duration),
            ("patrol.move_duration", self.patrol.move_duration),
            ("patrol.prepare_duration", self.patrol.prepare_duration),
            ("patrol.wander_distance", self.patrol.wander_distance),
            ("attack.linger_duration", self.attack.linger_duration),
        ];
        if let Some((name, range)) = ranges.iter().find(|(_, r)| !r.is_valid()) {
            return Err(ConfigError::Invalid(format!(
                "{name} must satisfy 0 <= min <= max, got [{}, {}]",
                range.min, range.max
            )));
        }

        let c = &self.combatant;
        if c.base_size <= Fixed::ZERO || c.base_range <= Fixed::ZERO {
            return Err(ConfigError::Invalid(
                "combatant base size and range must be positive".into(),
            ));
        }
        if c.size_growth_per_kill < Fixed::ZERO || c.range_growth_per_kill < Fixed::ZERO {
            return Err(ConfigError::Invalid("growth per kill cannot be negative".into()));
        }
        if c.attack_cooldown < Fixed::ZERO {
            return Err(ConfigError::Invalid("attack_cooldown cannot be negative".into()));
        }

        if let Some(w) = self
            .weapons
            .iter()
            .find(|w| w.speed <= Fixed::ZERO || w.max_distance <= Fixed::ZERO)
        {
            return Err(ConfigError::Invalid(format!(
                "weapon {:?} needs positive speed and max_distance",
                w.kind
            )));
        }

        let layout = &self.layout;
        if layout.bounds_min.x >= layout.bounds_max.x || layout.bounds_min.y >= layout.bounds_max.y
        {
            return Err(ConfigError::Invalid("layout bounds are empty".into()));
        }

        if self.pool.bot_capacity < self.spawn.bots_per_wave {
            return Err(ConfigError::Invalid(format!(
                "pool.bot_capacity {} cannot hold a wave of {} bots",
                self.pool.bot_capacity, self.spawn.bots_per_wave
            )));
        }

        if self.attack.target_check_interval < Fixed::ZERO
            || self.spawn.despawn_delay < Fixed::ZERO
        {
            return Err(ConfigError::Invalid("delays cannot be negative".into()));
        }

        Ok(())
    }
}
