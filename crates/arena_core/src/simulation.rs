//! Core simulation loop.
//!
//! The simulation runs at a fixed tick rate and owns every combatant,
//! projectile and timer of one arena level.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - One seeded random source per simulation
//! - Consistent iteration order (ascending entity ids)
//! - Same seed and inputs always produce the same outputs
//!
//! # Tick order
//!
//! 1. Advance the clock
//! 2. Player controller
//! 3. Bots, in id order: navigation and facing, then behavior state
//! 4. Projectiles, in id order: flight, contacts, expiry
//! 5. Deferred tasks whose wake time has passed
//!
//! # Example
//!
//! ```
//! use arena_core::prelude::*;
//!
//! let mut sim = Simulation::new(ArenaConfig::default().with_seed(7));
//! sim.initialize_level().unwrap();
//! sim.start_game().unwrap();
//!
//! for _ in 0..100 {
//!     let events = sim.tick();
//!     for (killer, victim) in events.kills() {
//!         println!("{killer:?} took out {victim}");
//!     }
//! }
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::behavior::{self, BehaviorState, BotWorld};
use crate::combat::{self, AttackOrder};
use crate::components::{Animation, Combatant, CombatantKind, EntityId};
use crate::config::{ArenaConfig, AttackConfig, PatrolConfig};
use crate::error::{ArenaError, Result};
use crate::events::{CoinReason, DespawnReason, SimEvent, SoundCue, TickEvents};
use crate::math::{Fixed, Vec2Fixed};
use crate::navigation::{DirectNavigation, Navigation};
use crate::player::{PlayerController, PlayerInput, PlayerIntent};
use crate::pool::{EntityPool, PoolKind, SlotPool};
use crate::projectile::{Contact, FlightStatus, Projectile};
use crate::rng::SimRng;
use crate::scheduler::{DeferredQueue, DeferredTask};
use crate::spawn::{self, SpawnDirector};
use crate::targeting::{find_nearest_target, TargetQuery};

/// Level lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Wave placed, bots waiting.
    Ready,
    /// Bots patrolling, win and loss checked.
    Playing,
    /// Every bot defeated.
    Victory,
    /// The player died during play.
    Defeat,
    /// Play stopped from outside.
    Stopped,
}

/// The arena simulation.
#[derive(Debug)]
pub struct Simulation {
    config: ArenaConfig,
    tick: u64,
    now: Fixed,
    delta: Fixed,
    phase: GamePhase,
    roster: BTreeMap<EntityId, Combatant>,
    projectiles: BTreeMap<EntityId, Projectile>,
    player: Option<EntityId>,
    controller: PlayerController,
    director: SpawnDirector,
    deferred: DeferredQueue,
    rng: SimRng,
    pool: Box<dyn EntityPool>,
    navigation: Box<dyn Navigation>,
    events: Vec<SimEvent>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

impl Simulation {
    /// Create an empty simulation with the built-in pool and navigation.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        let pool = Box::new(SlotPool::new(&config.pool));
        let navigation = Box::new(DirectNavigation::new(
            config.layout.bounds_min,
            config.layout.bounds_max,
        ));
        Self::with_services(config, pool, navigation)
    }

    /// Create an empty simulation with injected services.
    #[must_use]
    pub fn with_services(
        config: ArenaConfig,
        pool: Box<dyn EntityPool>,
        navigation: Box<dyn Navigation>,
    ) -> Self {
        let director = SpawnDirector::new(config.spawn, config.layout.spawn_points.clone());
        Self {
            tick: 0,
            now: Fixed::ZERO,
            delta: config.tick_delta(),
            phase: GamePhase::Ready,
            roster: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            player: None,
            controller: PlayerController::default(),
            director,
            deferred: DeferredQueue::new(),
            rng: SimRng::new(config.seed),
            pool,
            navigation,
            events: Vec::new(),
            config,
        }
    }

    // ---- Accessors ----

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Ticks processed so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time in seconds.
    #[must_use]
    pub const fn now(&self) -> Fixed {
        self.now
    }

    /// Seconds per tick.
    #[must_use]
    pub const fn tick_delta(&self) -> Fixed {
        self.delta
    }

    /// Level lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The player's id, once spawned.
    #[must_use]
    pub const fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Look up a combatant.
    #[must_use]
    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.roster.get(&id)
    }

    /// All combatants in id order, dead bodies included.
    pub fn combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.roster.values()
    }

    /// All bots in id order.
    pub fn bots(&self) -> impl Iterator<Item = &Combatant> {
        self.roster.values().filter(|c| c.is_bot())
    }

    /// Look up a projectile in flight.
    #[must_use]
    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// Projectiles in flight, in id order.
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Behavior state of a bot.
    #[must_use]
    pub fn bot_state(&self, bot: EntityId) -> Option<&BehaviorState> {
        self.roster.get(&bot)?.brain.as_ref()?.state.as_ref()
    }

    /// Spawn director.
    #[must_use]
    pub const fn director(&self) -> &SpawnDirector {
        &self.director
    }

    /// Deferred tasks still waiting.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    // ---- Level flow ----

    /// Place the player and the opening wave.
    ///
    /// Fails without spawning anything when the layout has too few spawn
    /// points.
    pub fn initialize_level(&mut self) -> Result<()> {
        let plan = match self.director.plan_wave(&mut self.rng) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!(error = %e, "Cannot initialize level");
                return Err(e);
            }
        };

        if self.spawn_player(plan.player).is_none() {
            tracing::warn!("Player pool exhausted");
        }
        for point in plan.bots {
            self.spawn_bot(point, false);
        }

        tracing::info!(
            seed = self.rng.seed(),
            bots = self.director.active_bots().len(),
            "Level initialized"
        );
        Ok(())
    }

    /// Start play: every registered bot begins patrolling.
    pub fn start_game(&mut self) -> Result<()> {
        if !matches!(self.phase, GamePhase::Ready | GamePhase::Stopped) {
            return Err(ArenaError::InvalidState(format!(
                "cannot start a game in phase {:?}",
                self.phase
            )));
        }
        self.phase = GamePhase::Playing;

        let bots = self.director.active_bots().to_vec();
        for bot in bots {
            if self.is_alive(bot) {
                behavior::change_state(self, bot, Some(BehaviorState::patrol()));
            }
        }
        tracing::info!(tick = self.tick, "Game started");
        Ok(())
    }

    /// Stop play and halt every bot.
    pub fn finish_game(&mut self) {
        self.phase = GamePhase::Stopped;
        self.stop_all_bots();
        tracing::info!(tick = self.tick, "Game finished");
    }

    /// Return every pooled entity and rebuild the opening wave.
    pub fn reset_level(&mut self) -> Result<()> {
        let in_flight: Vec<EntityId> = self.projectiles.keys().copied().collect();
        for id in in_flight {
            self.despawn_projectile(id, DespawnReason::LevelReset);
        }

        self.pool.collect_all();
        self.navigation.clear();
        self.roster.clear();
        self.deferred.clear();
        self.director.reset();
        self.controller.reset();
        self.player = None;
        self.phase = GamePhase::Ready;

        self.initialize_level()
    }

    /// Reset the level and start playing again.
    pub fn retry(&mut self) -> Result<()> {
        self.reset_level()?;
        self.start_game()
    }

    /// Replace the player's held input.
    pub fn set_player_input(&mut self, input: PlayerInput) {
        self.controller.set_input(input);
    }

    // ---- Spawning ----

    /// Spawn or respawn the player at `position`.
    pub fn spawn_player(&mut self, position: Vec2Fixed) -> Option<EntityId> {
        let facing = Vec2Fixed::new(Fixed::ZERO, -Fixed::ONE);
        self.controller.reset();

        if let Some(c) = self.player.and_then(|id| self.roster.get_mut(&id)) {
            c.reset();
            c.position = position;
            c.facing = facing;
            let id = c.id;
            self.change_animation(id, Animation::Idle);
            return Some(id);
        }

        let id = self.pool.spawn(PoolKind::Player)?;
        let mut player = Combatant::new(id, CombatantKind::Player, position, &self.config.combatant);
        player.facing = facing;
        self.roster.insert(id, player);
        self.player = Some(id);
        self.change_animation(id, Animation::Idle);
        Some(id)
    }

    /// Spawn a bot near `position`, optionally starting its patrol.
    ///
    /// Returns `None` when the level's bot cap is reached or the pool is
    /// exhausted.
    pub fn spawn_bot(&mut self, position: Vec2Fixed, start_ai: bool) -> Option<EntityId> {
        if !self.director.can_spawn() {
            tracing::debug!(
                spawned = self.director.spawned_count(),
                "Bot cap reached, not spawning"
            );
            return None;
        }

        let occupants: Vec<(Vec2Fixed, Fixed)> = self
            .roster
            .values()
            .map(|c| (c.position, c.hit_radius()))
            .collect();
        let position = spawn::find_clear_position(
            position,
            &occupants,
            &self.config.spawn,
            self.navigation.as_ref(),
            &mut self.rng,
        );

        let id = self.pool.spawn(PoolKind::Bot)?;
        let bot = Combatant::new(id, CombatantKind::Bot, position, &self.config.combatant);
        self.navigation.add_agent(id, bot.move_speed);
        self.roster.insert(id, bot);
        self.director.record_spawn(id);
        self.events.push(SimEvent::BotSpawned { bot: id, position });

        if start_ai {
            behavior::change_state(self, id, Some(BehaviorState::patrol()));
        } else {
            self.change_animation(id, Animation::Idle);
        }
        Some(id)
    }

    // ---- External requests ----

    /// Teleport a combatant.
    pub fn set_position(&mut self, id: EntityId, position: Vec2Fixed) -> Result<()> {
        let c = self
            .roster
            .get_mut(&id)
            .ok_or(ArenaError::EntityNotFound(id))?;
        c.position = position;
        Ok(())
    }

    /// Kill a combatant without a killer.
    ///
    /// Returns `Ok(false)` if it was already dead.
    pub fn kill_combatant(&mut self, id: EntityId) -> Result<bool> {
        if !self.roster.contains_key(&id) {
            return Err(ArenaError::EntityNotFound(id));
        }
        Ok(self.kill(id, None))
    }

    /// Attack `target` with `attacker`.
    ///
    /// A no-op returning `false` when the target is unknown or the attacker
    /// cannot attack. An exhausted projectile pool still consumes the
    /// cooldown.
    pub fn attack(&mut self, attacker: EntityId, target: EntityId) -> bool {
        let now = self.now;
        let Some(aim_point) = self.roster.get(&target).map(|t| t.position) else {
            return false;
        };
        let Some(order) = self
            .roster
            .get_mut(&attacker)
            .and_then(|a| combat::begin_attack(a, aim_point, now))
        else {
            return false;
        };

        self.change_animation(attacker, Animation::Attack);
        self.events.push(SimEvent::SoundPlayed(SoundCue::Attack));
        self.throw_weapon(&order);
        true
    }

    // ---- Tick ----

    /// Advance the simulation by one tick.
    ///
    /// Returns every event emitted since the previous tick, including those
    /// raised by level-flow calls made in between.
    pub fn tick(&mut self) -> TickEvents {
        self.now += self.delta;

        self.update_player();

        let bots: Vec<EntityId> = self.bots().map(|c| c.id).collect();
        for bot in bots {
            self.update_bot(bot);
        }

        self.update_projectiles();
        self.run_deferred();

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        let events = TickEvents {
            tick: self.tick,
            events: std::mem::take(&mut self.events),
        };
        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    fn update_player(&mut self) {
        let Some(player) = self.player.filter(|&id| self.is_alive(id)) else {
            return;
        };

        match self.controller.next_intent() {
            Some(PlayerIntent::Move(direction)) => self.move_player(player, direction),
            Some(PlayerIntent::Attack) => self.player_attack(player),
            Some(PlayerIntent::Rest) => self.change_animation(player, Animation::Idle),
            None => {}
        }
    }

    fn move_player(&mut self, player: EntityId, direction: Vec2Fixed) {
        if direction.is_zero() {
            return;
        }
        let dt = self.delta;
        let Some(c) = self.roster.get_mut(&player) else {
            return;
        };
        let next = c.position + direction.scale(c.move_speed * dt);
        if self.navigation.is_navigable(next) {
            c.position = next;
        }
        c.face_along(direction);
        self.change_animation(player, Animation::Run);
    }

    fn player_attack(&mut self, player: EntityId) {
        let now = self.now;
        let ready = self
            .roster
            .get(&player)
            .is_some_and(|c| combat::can_attack(c, now));
        let target = if ready { self.find_opponent(player) } else { None };

        match target {
            Some(target) => {
                self.controller.attack_resolved(true);
                self.attack(player, target);
                let wake = now + self.config.player.attack_animation_time;
                self.deferred.schedule(wake, DeferredTask::PlayerIdle(player));
            }
            None => {
                self.controller.attack_resolved(false);
                self.change_animation(player, Animation::Idle);
            }
        }
    }

    fn update_bot(&mut self, bot: EntityId) {
        let dt = self.delta;
        let Some(c) = self.roster.get(&bot).filter(|c| c.is_alive()) else {
            return;
        };

        let position = self.navigation.advance(bot, c.position, dt);
        let velocity = self.navigation.velocity(bot);
        let min_speed = Fixed::ONE / Fixed::from_num(10);
        if let Some(c) = self.roster.get_mut(&bot) {
            c.position = position;
            if velocity.dot(velocity) > min_speed * min_speed {
                c.face_along(velocity);
            }
        }

        behavior::execute(self, bot);
    }

    fn update_projectiles(&mut self) {
        let dt = self.delta;
        let ids: Vec<EntityId> = self.projectiles.keys().copied().collect();

        for id in ids {
            // Already despawned this tick by its owner's death.
            let Some(projectile) = self.projectiles.get_mut(&id) else {
                continue;
            };
            let from = projectile.position;
            let status = projectile.advance(dt);
            let owner = projectile.owner;
            let contact =
                projectile.first_contact(from, self.roster.values(), &self.config.layout.obstacles);

            match contact {
                Some(Contact::Combatant(victim)) => self.resolve_hit(id, owner, victim),
                Some(Contact::Obstacle) => {
                    self.despawn_projectile(id, DespawnReason::Blocked);
                }
                None if status == FlightStatus::Expired => {
                    self.despawn_projectile(id, DespawnReason::Expired);
                }
                None => {}
            }
        }
    }

    fn resolve_hit(&mut self, projectile: EntityId, owner: Option<EntityId>, victim: EntityId) {
        if let Some(killer) = owner.and_then(|o| self.roster.get_mut(&o)) {
            killer.record_kill();
            let event = SimEvent::GrowthUpdated {
                entity: killer.id,
                kill_count: killer.kill_count(),
            };
            self.events.push(event);
        }
        self.kill(victim, owner);
        self.despawn_projectile(projectile, DespawnReason::Hit);
    }

    fn run_deferred(&mut self) {
        while let Some(task) = self.deferred.pop_due(self.now) {
            match task {
                DeferredTask::DespawnBot(bot) => self.despawn_bot(bot),
                DeferredTask::ShowWeapon(id) => {
                    if self.is_alive(id) {
                        self.set_weapon_visible(id, true);
                    }
                }
                DeferredTask::PlayerIdle(id) => {
                    if self.is_alive(id) && self.controller.finish_attack() {
                        self.change_animation(id, Animation::Idle);
                    }
                }
            }
        }
    }

    // ---- Combat plumbing ----

    fn throw_weapon(&mut self, order: &AttackOrder) {
        let attacker = order.attacker;
        self.set_weapon_visible(attacker, false);
        let wake = self.now + self.config.combatant.weapon_reshow_delay;
        self.deferred.schedule(wake, DeferredTask::ShowWeapon(attacker));

        let Some(id) = self.pool.spawn(PoolKind::Projectile(order.weapon)) else {
            tracing::warn!(%attacker, weapon = ?order.weapon, "No projectile available");
            return;
        };

        let stats = self.config.weapon(order.weapon);
        let projectile = Projectile::launch(
            id,
            Some(attacker),
            order.origin,
            order.aim_point,
            order.target_layers,
            &stats,
        );
        self.events.push(SimEvent::ProjectileLaunched {
            projectile: id,
            owner: attacker,
            weapon: order.weapon,
            origin: order.origin,
            direction: projectile.direction(),
        });
        if let Some(a) = self.roster.get_mut(&attacker) {
            a.register_projectile(id);
        }
        self.projectiles.insert(id, projectile);
    }

    /// Kill a combatant and run its death cascade. Idempotent.
    fn kill(&mut self, victim: EntityId, killer: Option<EntityId>) -> bool {
        let Some(c) = self.roster.get_mut(&victim) else {
            return false;
        };
        if !c.mark_dead() {
            return false;
        }
        let kind = c.kind;

        for projectile in c.take_projectiles() {
            self.despawn_projectile(projectile, DespawnReason::OwnerDied);
        }
        self.change_animation(victim, Animation::Dead);
        self.events.push(SimEvent::SoundPlayed(SoundCue::Death));
        self.events.push(SimEvent::CombatantKilled { killer, victim });
        tracing::debug!(%victim, ?killer, "Combatant killed");

        match kind {
            CombatantKind::Bot => {
                self.navigation.set_enabled(victim, false);
                behavior::change_state(self, victim, None);
                let wake = self.now + self.config.spawn.despawn_delay;
                self.deferred.schedule(wake, DeferredTask::DespawnBot(victim));
            }
            CombatantKind::Player => {
                self.controller.reset();
                self.on_player_death();
            }
        }
        true
    }

    fn despawn_projectile(&mut self, id: EntityId, reason: DespawnReason) -> bool {
        let Some(mut projectile) = self.projectiles.remove(&id) else {
            return false;
        };
        if let Some(owner) = projectile.owner.and_then(|o| self.roster.get_mut(&o)) {
            owner.unregister_projectile(id);
        }
        projectile.ground();
        self.pool.despawn(id);
        self.events.push(SimEvent::ProjectileDespawned {
            projectile: id,
            reason,
        });
        tracing::debug!(projectile = %id, ?reason, "Projectile despawned");
        true
    }

    // ---- Level plumbing ----

    fn despawn_bot(&mut self, bot: EntityId) {
        if !self.roster.contains_key(&bot) {
            return;
        }

        self.events.push(SimEvent::CoinsAwarded {
            amount: self.config.rewards.coins_per_bot,
            reason: CoinReason::BotDefeated,
        });

        self.director.remove(bot);
        // Free the pool slot before asking for a replacement.
        self.roster.remove(&bot);
        self.navigation.remove_agent(bot);
        self.pool.despawn(bot);
        self.events.push(SimEvent::BotDespawned { bot });

        if let Some(point) = self.director.replacement_point(&mut self.rng) {
            let start_ai = self.phase == GamePhase::Playing;
            self.spawn_bot(point, start_ai);
        }
        self.check_win_condition();
    }

    fn check_win_condition(&mut self) {
        if self.phase != GamePhase::Playing || !self.director.is_won() {
            return;
        }
        self.phase = GamePhase::Victory;
        if let Some(player) = self.player {
            self.change_animation(player, Animation::Win);
        }
        self.events.push(SimEvent::CoinsAwarded {
            amount: self.config.rewards.coins_on_victory,
            reason: CoinReason::Victory,
        });
        self.events.push(SimEvent::SoundPlayed(SoundCue::Victory));
        self.events.push(SimEvent::LevelWon);
        tracing::info!(tick = self.tick, "Level won");
    }

    fn on_player_death(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Defeat;
        self.stop_all_bots();
        self.events.push(SimEvent::SoundPlayed(SoundCue::Fail));
        self.events.push(SimEvent::PlayerDefeated);
        tracing::info!(tick = self.tick, "Player defeated");
    }

    fn stop_all_bots(&mut self) {
        let bots = self.director.active_bots().to_vec();
        for bot in bots {
            if !self.is_alive(bot) {
                continue;
            }
            behavior::change_state(self, bot, None);
            self.navigation.stop(bot);
            self.change_animation(bot, Animation::Idle);
        }
    }

    // ---- Helpers ----

    fn is_alive(&self, id: EntityId) -> bool {
        self.roster.get(&id).is_some_and(Combatant::is_alive)
    }

    fn find_opponent(&self, id: EntityId) -> Option<EntityId> {
        let searcher = self.roster.get(&id)?;
        find_nearest_target(self.roster.values(), &TargetQuery::opponents_of(searcher))
    }

    fn change_animation(&mut self, id: EntityId, animation: Animation) {
        if let Some(c) = self.roster.get_mut(&id) {
            if c.set_animation(animation) {
                self.events.push(SimEvent::AnimationChanged {
                    entity: id,
                    animation,
                });
            }
        }
    }

    fn set_weapon_visible(&mut self, id: EntityId, visible: bool) {
        if let Some(c) = self.roster.get_mut(&id) {
            if c.weapon_in_hand != visible {
                c.weapon_in_hand = visible;
                self.events.push(SimEvent::WeaponVisibility {
                    entity: id,
                    visible,
                });
            }
        }
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        for projectile in self.projectiles.values() {
            if let Some(owner) = projectile.owner.and_then(|o| self.roster.get(&o)) {
                debug_assert!(
                    owner.active_projectiles().contains(&projectile.id),
                    "projectile {} missing from its owner's list",
                    projectile.id
                );
            }
        }
        for bot in self.director.active_bots() {
            debug_assert!(self.roster.contains_key(bot), "registered bot {bot} not in roster");
        }
    }

    /// Compute a hash of the simulation state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.now.to_bits().hash(&mut hasher);
        self.phase.hash(&mut hasher);

        self.roster.len().hash(&mut hasher);
        for (id, c) in &self.roster {
            id.hash(&mut hasher);
            c.position.x.to_bits().hash(&mut hasher);
            c.position.y.to_bits().hash(&mut hasher);
            c.facing.x.to_bits().hash(&mut hasher);
            c.facing.y.to_bits().hash(&mut hasher);
            c.is_alive().hash(&mut hasher);
            c.kill_count().hash(&mut hasher);
            c.last_attack_time().to_bits().hash(&mut hasher);
            if let Some(state) = c.brain.as_ref().and_then(|b| b.state.as_ref()) {
                state.kind().hash(&mut hasher);
            }
        }

        self.projectiles.len().hash(&mut hasher);
        for (id, p) in &self.projectiles {
            id.hash(&mut hasher);
            p.position.x.to_bits().hash(&mut hasher);
            p.position.y.to_bits().hash(&mut hasher);
        }

        self.director.spawned_count().hash(&mut hasher);
        self.director.active_bots().hash(&mut hasher);

        hasher.finish()
    }
}

impl BotWorld for Simulation {
    fn delta(&self) -> Fixed {
        self.delta
    }

    fn patrol_config(&self) -> PatrolConfig {
        self.config.patrol
    }

    fn attack_config(&self) -> AttackConfig {
        self.config.attack
    }

    fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    fn take_state(&mut self, bot: EntityId) -> Option<BehaviorState> {
        self.roster
            .get_mut(&bot)
            .and_then(|c| c.brain.as_mut())
            .and_then(|brain| brain.state.take())
    }

    fn store_state(&mut self, bot: EntityId, state: Option<BehaviorState>) {
        if let Some(brain) = self.roster.get_mut(&bot).and_then(|c| c.brain.as_mut()) {
            brain.state = state;
        }
    }

    fn nearest_opponent(&self, bot: EntityId) -> Option<EntityId> {
        self.find_opponent(bot)
    }

    fn nearest_character(&self, bot: EntityId) -> Option<EntityId> {
        let searcher = self.roster.get(&bot)?;
        find_nearest_target(self.roster.values(), &TargetQuery::anyone_but(searcher))
    }

    fn is_in_attack_range(&self, bot: EntityId, target: EntityId) -> bool {
        let (Some(me), Some(other)) = (self.roster.get(&bot), self.roster.get(&target)) else {
            return false;
        };
        other.is_alive() && me.position.distance_squared(other.position) <= me.range() * me.range()
    }

    fn position_of(&self, id: EntityId) -> Option<Vec2Fixed> {
        self.roster.get(&id).map(|c| c.position)
    }

    fn try_attack(&mut self, bot: EntityId, target: EntityId) -> bool {
        self.attack(bot, target)
    }

    fn set_destination(&mut self, bot: EntityId, destination: Vec2Fixed) {
        self.navigation.set_destination(bot, destination);
        if let Some(brain) = self.roster.get_mut(&bot).and_then(|c| c.brain.as_mut()) {
            brain.destination = Some(destination);
        }
    }

    fn move_stop(&mut self, bot: EntityId) {
        self.navigation.stop(bot);
    }

    fn resume_navigation(&mut self, bot: EntityId) {
        if self.is_alive(bot) {
            self.navigation.resume(bot);
        }
    }

    fn has_arrived(&self, bot: EntityId) -> bool {
        let Some(c) = self.roster.get(&bot) else {
            return false;
        };
        let threshold = self.config.patrol.arrival_threshold;
        c.brain
            .as_ref()
            .and_then(|brain| brain.destination)
            .is_some_and(|d| c.position.distance_squared(d) < threshold * threshold)
    }

    fn sample_navigable(&self, point: Vec2Fixed, max_distance: Fixed) -> Option<Vec2Fixed> {
        self.navigation.sample_position(point, max_distance)
    }

    fn set_animation(&mut self, bot: EntityId, animation: Animation) {
        self.change_animation(bot, animation);
    }
}
