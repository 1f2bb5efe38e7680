//! Bot behavior state machine.
//!
//! A bot holds at most one [`BehaviorState`]. States are tagged enum
//! variants whose timers are updated in place; a transition exits the old
//! state, then enters and stores the new one. The machine talks to the rest
//! of the simulation only through the [`BotWorld`] trait.
//!
//! ```text
//!            target in range          prep elapsed
//!  Patrol ─────────────────────▶ Patrol ─────────────▶ Attack
//! (Idling ⇄ Moving)          (PreparingAttack)           │
//!      ▲                                                 │
//!      └──────── target lost / post-attack wait over ────┘
//! ```

use crate::components::{Animation, EntityId};
use crate::config::{AttackConfig, PatrolConfig};
use crate::math::{Fixed, Vec2Fixed};
use crate::rng::SimRng;

/// Everything a behavior state may ask of the simulation.
pub trait BotWorld {
    /// Seconds covered by the current tick.
    fn delta(&self) -> Fixed;

    /// Patrol timings.
    fn patrol_config(&self) -> PatrolConfig;

    /// Attack timings.
    fn attack_config(&self) -> AttackConfig;

    /// The simulation's random source.
    fn rng(&mut self) -> &mut SimRng;

    /// Remove the bot's state for execution.
    fn take_state(&mut self, bot: EntityId) -> Option<BehaviorState>;

    /// Put a state back into the bot's brain.
    fn store_state(&mut self, bot: EntityId, state: Option<BehaviorState>);

    /// Nearest live opponent within the bot's attack range.
    fn nearest_opponent(&self, bot: EntityId) -> Option<EntityId>;

    /// Nearest live combatant of any layer, at any distance.
    fn nearest_character(&self, bot: EntityId) -> Option<EntityId>;

    /// Whether `target` is alive and within the bot's attack range.
    fn is_in_attack_range(&self, bot: EntityId, target: EntityId) -> bool;

    /// Position of a combatant.
    fn position_of(&self, id: EntityId) -> Option<Vec2Fixed>;

    /// Attack `target`. Returns whether the attack was performed.
    fn try_attack(&mut self, bot: EntityId, target: EntityId) -> bool;

    /// Send the bot toward a point.
    fn set_destination(&mut self, bot: EntityId, destination: Vec2Fixed);

    /// Halt the bot's navigation.
    fn move_stop(&mut self, bot: EntityId);

    /// Un-halt the bot's navigation if it is still enabled.
    fn resume_navigation(&mut self, bot: EntityId);

    /// Whether the bot has reached its destination.
    fn has_arrived(&self, bot: EntityId) -> bool;

    /// Snap a point to the navigable surface.
    fn sample_navigable(&self, point: Vec2Fixed, max_distance: Fixed) -> Option<Vec2Fixed>;

    /// Switch the bot's animation.
    fn set_animation(&mut self, bot: EntityId, animation: Animation);
}

/// Per-bot AI data stored on the combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotBrain {
    /// Active state; `None` means the AI is halted.
    pub state: Option<BehaviorState>,
    /// Last destination handed to navigation.
    pub destination: Option<Vec2Fixed>,
}

/// Discriminant of a [`BehaviorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    /// Wandering and watching for targets.
    Patrol,
    /// Throwing at a target in range.
    Attack,
}

/// Sub-phases of patrol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatrolPhase {
    /// Standing still.
    Idling,
    /// Walking to a destination.
    Moving,
    /// Target spotted, waiting to attack.
    PreparingAttack,
}

/// Patrol state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatrolState {
    phase: PatrolPhase,
    elapsed: Fixed,
    duration: Fixed,
}

impl Default for PatrolState {
    fn default() -> Self {
        Self {
            phase: PatrolPhase::Idling,
            elapsed: Fixed::ZERO,
            duration: Fixed::ZERO,
        }
    }
}

impl PatrolState {
    /// Current sub-phase.
    #[must_use]
    pub const fn phase(&self) -> PatrolPhase {
        self.phase
    }

    /// Seconds spent in the current sub-phase.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Length of the current sub-phase.
    #[must_use]
    pub const fn duration(&self) -> Fixed {
        self.duration
    }

    fn begin(&mut self, phase: PatrolPhase, duration: Fixed) {
        self.phase = phase;
        self.elapsed = Fixed::ZERO;
        self.duration = duration;
    }

    fn enter<W: BotWorld + ?Sized>(&mut self, bot: EntityId, world: &mut W) {
        self.start_idling(bot, world);
    }

    fn execute<W: BotWorld + ?Sized>(
        &mut self,
        bot: EntityId,
        world: &mut W,
    ) -> Option<BehaviorState> {
        self.elapsed += world.delta();

        if let Some(target) = world
            .nearest_opponent(bot)
            .filter(|&t| world.is_in_attack_range(bot, t))
        {
            if self.phase != PatrolPhase::PreparingAttack {
                self.start_preparing(bot, target, world);
            } else if self.elapsed >= self.duration {
                return Some(BehaviorState::attack());
            }
            return None;
        }

        match self.phase {
            PatrolPhase::Idling if self.elapsed >= self.duration => {
                self.start_moving(bot, world);
            }
            PatrolPhase::Moving if self.elapsed >= self.duration || world.has_arrived(bot) => {
                self.start_idling(bot, world);
            }
            // Losing the target while preparing does not fall back to idling.
            _ => {}
        }
        None
    }

    fn start_idling<W: BotWorld + ?Sized>(&mut self, bot: EntityId, world: &mut W) {
        let range = world.patrol_config().idle_duration;
        let duration = world.rng().range(range.min, range.max);
        self.begin(PatrolPhase::Idling, duration);
        world.set_animation(bot, Animation::Idle);
        world.move_stop(bot);
    }

    fn start_moving<W: BotWorld + ?Sized>(&mut self, bot: EntityId, world: &mut W) {
        let config = world.patrol_config();
        let duration = world
            .rng()
            .range(config.move_duration.min, config.move_duration.max);
        self.begin(PatrolPhase::Moving, duration);
        world.set_animation(bot, Animation::Run);

        let chase = world
            .nearest_character(bot)
            .and_then(|target| world.position_of(target));
        let destination = match chase {
            Some(position) => Some(position),
            None => Self::wander_point(bot, &config, world),
        };
        if let Some(destination) = destination {
            world.set_destination(bot, destination);
        }
    }

    fn wander_point<W: BotWorld + ?Sized>(
        bot: EntityId,
        config: &PatrolConfig,
        world: &mut W,
    ) -> Option<Vec2Fixed> {
        let origin = world.position_of(bot)?;
        let rng = world.rng();
        let direction = rng.unit_direction();
        let distance = rng.range(config.wander_distance.min, config.wander_distance.max);
        world.sample_navigable(origin + direction.scale(distance), config.wander_sample_radius)
    }

    fn start_preparing<W: BotWorld + ?Sized>(
        &mut self,
        bot: EntityId,
        target: EntityId,
        world: &mut W,
    ) {
        let config = world.patrol_config();
        let rng = world.rng();
        let duration = rng.range(config.prepare_duration.min, config.prepare_duration.max);
        let keep_moving = rng.chance(config.keep_moving_chance);
        self.begin(PatrolPhase::PreparingAttack, duration);

        match world.position_of(target) {
            Some(position) if keep_moving => {
                world.set_animation(bot, Animation::Run);
                world.set_destination(bot, position);
            }
            _ => {
                world.set_animation(bot, Animation::Idle);
                world.move_stop(bot);
            }
        }
    }
}

/// Attack state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackState {
    check_timer: Fixed,
    has_attacked: bool,
    linger_elapsed: Fixed,
    linger_duration: Fixed,
}

impl AttackState {
    /// Whether a throw has been made in this state.
    #[must_use]
    pub const fn has_attacked(&self) -> bool {
        self.has_attacked
    }

    /// Post-attack wait rolled after the throw.
    #[must_use]
    pub const fn linger_duration(&self) -> Fixed {
        self.linger_duration
    }

    fn enter<W: BotWorld + ?Sized>(&mut self, bot: EntityId, world: &mut W) {
        *self = Self::default();
        world.move_stop(bot);
    }

    fn execute<W: BotWorld + ?Sized>(
        &mut self,
        bot: EntityId,
        world: &mut W,
    ) -> Option<BehaviorState> {
        let dt = world.delta();

        if self.has_attacked {
            self.linger_elapsed += dt;
            if self.linger_elapsed >= self.linger_duration {
                return Some(BehaviorState::patrol());
            }
            return None;
        }

        let config = world.attack_config();
        self.check_timer += dt;
        if self.check_timer < config.target_check_interval {
            return None;
        }
        self.check_timer = Fixed::ZERO;

        let Some(target) = world
            .nearest_opponent(bot)
            .filter(|&t| world.is_in_attack_range(bot, t))
        else {
            return Some(BehaviorState::patrol());
        };

        if world.try_attack(bot, target) {
            self.has_attacked = true;
            self.linger_elapsed = Fixed::ZERO;
            let rng = world.rng();
            self.linger_duration = if rng.chance(config.linger_chance) {
                rng.range(config.linger_duration.min, config.linger_duration.max)
            } else {
                Fixed::ZERO
            };
        }
        None
    }

    fn exit<W: BotWorld + ?Sized>(&mut self, bot: EntityId, world: &mut W) {
        world.resume_navigation(bot);
    }
}

/// The active behavior of a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorState {
    /// Wander and watch for targets.
    Patrol(PatrolState),
    /// Throw at a target in range.
    Attack(AttackState),
}

impl BehaviorState {
    /// A fresh patrol state.
    #[must_use]
    pub fn patrol() -> Self {
        Self::Patrol(PatrolState::default())
    }

    /// A fresh attack state.
    #[must_use]
    pub fn attack() -> Self {
        Self::Attack(AttackState::default())
    }

    /// Which state this is.
    #[must_use]
    pub const fn kind(&self) -> BehaviorKind {
        match self {
            Self::Patrol(_) => BehaviorKind::Patrol,
            Self::Attack(_) => BehaviorKind::Attack,
        }
    }

    fn enter<W: BotWorld + ?Sized>(&mut self, bot: EntityId, world: &mut W) {
        match self {
            Self::Patrol(state) => state.enter(bot, world),
            Self::Attack(state) => state.enter(bot, world),
        }
    }

    fn execute<W: BotWorld + ?Sized>(
        &mut self,
        bot: EntityId,
        world: &mut W,
    ) -> Option<BehaviorState> {
        match self {
            Self::Patrol(state) => state.execute(bot, world),
            Self::Attack(state) => state.execute(bot, world),
        }
    }

    fn exit<W: BotWorld + ?Sized>(&mut self, bot: EntityId, world: &mut W) {
        match self {
            Self::Patrol(_) => {}
            Self::Attack(state) => state.exit(bot, world),
        }
    }
}

/// Replace a bot's state: exit the old one, then enter and store the new one.
///
/// Passing `None` halts the bot's AI.
pub fn change_state<W: BotWorld + ?Sized>(
    world: &mut W,
    bot: EntityId,
    next: Option<BehaviorState>,
) {
    let previous = world.take_state(bot).map(|mut old| {
        old.exit(bot, world);
        old.kind()
    });

    let mut next = next;
    if let Some(state) = next.as_mut() {
        state.enter(bot, world);
    }

    tracing::debug!(
        %bot,
        from = ?previous,
        to = ?next.as_ref().map(BehaviorState::kind),
        "Bot state changed"
    );
    world.store_state(bot, next);
}

/// Run one tick of the bot's current state and apply any transition.
pub fn execute<W: BotWorld + ?Sized>(world: &mut W, bot: EntityId) {
    let Some(mut state) = world.take_state(bot) else {
        return;
    };
    let next = state.execute(bot, world);
    world.store_state(bot, Some(state));
    if let Some(next) = next {
        change_state(world, bot, Some(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted world recording every side effect.
    struct FakeWorld {
        rng: SimRng,
        state: Option<BehaviorState>,
        bot_position: Vec2Fixed,
        opponent: Option<(EntityId, Vec2Fixed)>,
        opponent_in_range: bool,
        arrived: bool,
        attack_succeeds: bool,
        attacks: u32,
        log: Vec<String>,
    }

    const BOT: EntityId = EntityId::new(0, 0);
    const FOE: EntityId = EntityId::new(1, 0);

    impl FakeWorld {
        fn new(seed: u64) -> Self {
            Self {
                rng: SimRng::new(seed),
                state: None,
                bot_position: Vec2Fixed::ZERO,
                opponent: None,
                opponent_in_range: false,
                arrived: false,
                attack_succeeds: true,
                attacks: 0,
                log: Vec::new(),
            }
        }

        fn with_foe_in_range(mut self) -> Self {
            self.opponent = Some((FOE, Vec2Fixed::from_ints(4, 0)));
            self.opponent_in_range = true;
            self
        }

        fn kind(&self) -> Option<BehaviorKind> {
            self.state.as_ref().map(BehaviorState::kind)
        }

        fn patrol(&self) -> PatrolState {
            match self.state {
                Some(BehaviorState::Patrol(p)) => p,
                other => panic!("expected patrol, got {other:?}"),
            }
        }

        fn attack_state(&self) -> AttackState {
            match self.state {
                Some(BehaviorState::Attack(a)) => a,
                other => panic!("expected attack, got {other:?}"),
            }
        }

        /// Tick until the first throw, returning the rolled wait.
        fn attack_once(&mut self) -> Fixed {
            for _ in 0..10 {
                execute(self, BOT);
                if self.attack_state().has_attacked() {
                    return self.attack_state().linger_duration();
                }
            }
            panic!("no throw within a second");
        }

        fn run_for(&mut self, seconds: u32) {
            for _ in 0..seconds * 10 {
                execute(self, BOT);
            }
        }
    }

    impl BotWorld for FakeWorld {
        fn delta(&self) -> Fixed {
            Fixed::ONE / Fixed::from_num(10)
        }
        fn patrol_config(&self) -> PatrolConfig {
            PatrolConfig::default()
        }
        fn attack_config(&self) -> AttackConfig {
            AttackConfig::default()
        }
        fn rng(&mut self) -> &mut SimRng {
            &mut self.rng
        }
        fn take_state(&mut self, _bot: EntityId) -> Option<BehaviorState> {
            self.state.take()
        }
        fn store_state(&mut self, _bot: EntityId, state: Option<BehaviorState>) {
            self.state = state;
        }
        fn nearest_opponent(&self, _bot: EntityId) -> Option<EntityId> {
            self.opponent.filter(|_| self.opponent_in_range).map(|(id, _)| id)
        }
        fn nearest_character(&self, _bot: EntityId) -> Option<EntityId> {
            self.opponent.map(|(id, _)| id)
        }
        fn is_in_attack_range(&self, _bot: EntityId, _target: EntityId) -> bool {
            self.opponent_in_range
        }
        fn position_of(&self, id: EntityId) -> Option<Vec2Fixed> {
            if id == BOT {
                return Some(self.bot_position);
            }
            self.opponent.filter(|(foe, _)| *foe == id).map(|(_, p)| p)
        }
        fn try_attack(&mut self, _bot: EntityId, _target: EntityId) -> bool {
            self.log.push("attack".into());
            self.attacks += 1;
            self.attack_succeeds
        }
        fn set_destination(&mut self, _bot: EntityId, destination: Vec2Fixed) {
            self.log.push(format!("destination {destination:?}"));
        }
        fn move_stop(&mut self, _bot: EntityId) {
            self.log.push("stop".into());
        }
        fn resume_navigation(&mut self, _bot: EntityId) {
            self.log.push("resume".into());
        }
        fn has_arrived(&self, _bot: EntityId) -> bool {
            self.arrived
        }
        fn sample_navigable(&self, point: Vec2Fixed, _max_distance: Fixed) -> Option<Vec2Fixed> {
            Some(point)
        }
        fn set_animation(&mut self, _bot: EntityId, animation: Animation) {
            self.log.push(animation.name().into());
        }
    }

    #[test]
    fn test_patrol_enters_idling() {
        let mut world = FakeWorld::new(1);
        change_state(&mut world, BOT, Some(BehaviorState::patrol()));

        let patrol = world.patrol();
        assert_eq!(patrol.phase(), PatrolPhase::Idling);
        assert!(PatrolConfig::default().idle_duration.contains(patrol.duration()));
        assert_eq!(world.log, vec!["idle", "stop"]);
    }

    #[test]
    fn test_idling_expires_into_moving() {
        let mut world = FakeWorld::new(2);
        change_state(&mut world, BOT, Some(BehaviorState::patrol()));
        world.run_for(4);

        let patrol = world.patrol();
        assert_eq!(patrol.phase(), PatrolPhase::Moving);
        assert!(PatrolConfig::default().move_duration.contains(patrol.duration()));
        assert!(world.log.iter().any(|l| l == "run"));
        assert!(world.log.iter().any(|l| l.starts_with("destination")));
    }

    #[test]
    fn test_arrival_ends_moving() {
        let mut world = FakeWorld::new(3);
        change_state(&mut world, BOT, Some(BehaviorState::patrol()));
        world.run_for(4);
        assert_eq!(world.patrol().phase(), PatrolPhase::Moving);

        world.arrived = true;
        execute(&mut world, BOT);
        assert_eq!(world.patrol().phase(), PatrolPhase::Idling);
    }

    #[test]
    fn test_target_in_range_leads_to_attack() {
        let mut world = FakeWorld::new(4).with_foe_in_range();
        change_state(&mut world, BOT, Some(BehaviorState::patrol()));

        execute(&mut world, BOT);
        assert_eq!(world.patrol().phase(), PatrolPhase::PreparingAttack);
        assert!(PatrolConfig::default()
            .prepare_duration
            .contains(world.patrol().duration()));

        let mut attacking = false;
        for _ in 0..30 {
            execute(&mut world, BOT);
            if world.kind() == Some(BehaviorKind::Attack) {
                attacking = true;
                break;
            }
        }
        assert!(attacking);
    }

    #[test]
    fn test_lost_target_does_not_leave_preparing() {
        let mut world = FakeWorld::new(5).with_foe_in_range();
        change_state(&mut world, BOT, Some(BehaviorState::patrol()));
        execute(&mut world, BOT);
        assert_eq!(world.patrol().phase(), PatrolPhase::PreparingAttack);

        world.opponent_in_range = false;
        world.run_for(5);
        assert_eq!(world.kind(), Some(BehaviorKind::Patrol));
        assert_eq!(world.patrol().phase(), PatrolPhase::PreparingAttack);

        world.opponent_in_range = true;
        execute(&mut world, BOT);
        assert_eq!(world.kind(), Some(BehaviorKind::Attack));
    }

    #[test]
    fn test_attack_checks_on_interval_then_lingers() {
        let mut world = FakeWorld::new(6).with_foe_in_range();
        change_state(&mut world, BOT, Some(BehaviorState::attack()));
        assert_eq!(world.log, vec!["stop"]);

        execute(&mut world, BOT);
        execute(&mut world, BOT);
        assert_eq!(world.attacks, 0, "no check before the interval elapses");
        assert!(!world.attack_state().has_attacked());

        let linger = world.attack_once();
        assert_eq!(world.attacks, 1);

        let mut waited = Fixed::ZERO;
        while world.kind() == Some(BehaviorKind::Attack) {
            assert!(waited <= linger, "left the wait late");
            execute(&mut world, BOT);
            waited += world.delta();
        }
        assert!(waited >= linger, "left the wait early");
        assert_eq!(world.attacks, 1, "attacks once per attack state");
        assert_eq!(world.kind(), Some(BehaviorKind::Patrol));
    }

    #[test]
    fn test_post_attack_wait_is_zero_or_in_range() {
        let config = AttackConfig::default();
        let mut waited_zero = false;
        let mut waited_some = false;

        for seed in 0..32 {
            let mut world = FakeWorld::new(seed).with_foe_in_range();
            change_state(&mut world, BOT, Some(BehaviorState::attack()));
            let linger = world.attack_once();

            if linger == Fixed::ZERO {
                waited_zero = true;
            } else {
                assert!(config.linger_duration.contains(linger), "seed {seed}: {linger}");
                waited_some = true;
            }

            let mut waited = Fixed::ZERO;
            loop {
                execute(&mut world, BOT);
                waited += world.delta();
                if world.kind() == Some(BehaviorKind::Patrol) {
                    break;
                }
                assert!(waited < linger, "seed {seed}: still waiting after {waited}");
            }
            assert!(waited >= linger, "seed {seed}: back to patrol after {waited}");
        }

        assert!(waited_zero && waited_some, "both outcomes occur across seeds");
    }

    #[test]
    fn test_preparing_either_chases_or_stands() {
        let chase = vec![
            "run".to_string(),
            format!("destination {:?}", Vec2Fixed::from_ints(4, 0)),
        ];
        let stand = vec!["idle".to_string(), "stop".to_string()];
        let mut chased = false;
        let mut stood = false;

        for seed in 0..32 {
            let mut world = FakeWorld::new(seed).with_foe_in_range();
            change_state(&mut world, BOT, Some(BehaviorState::patrol()));
            world.log.clear();

            execute(&mut world, BOT);
            assert_eq!(world.patrol().phase(), PatrolPhase::PreparingAttack);
            if world.log == chase {
                chased = true;
            } else {
                assert_eq!(world.log, stand, "seed {seed}");
                stood = true;
            }
        }

        assert!(chased && stood, "both branches occur across seeds");
    }

    #[test]
    fn test_attack_returns_to_patrol_with_exit_before_enter() {
        let mut world = FakeWorld::new(7).with_foe_in_range();
        change_state(&mut world, BOT, Some(BehaviorState::attack()));
        world.opponent_in_range = false;
        world.log.clear();

        world.run_for(1);
        assert_eq!(world.kind(), Some(BehaviorKind::Patrol));
        assert_eq!(world.log, vec!["resume", "idle", "stop"]);
        assert_eq!(world.attacks, 0);
    }

    #[test]
    fn test_failed_attack_keeps_checking() {
        let mut world = FakeWorld::new(8).with_foe_in_range();
        world.attack_succeeds = false;
        change_state(&mut world, BOT, Some(BehaviorState::attack()));
        world.run_for(2);
        assert_eq!(world.kind(), Some(BehaviorKind::Attack));
        assert!(world.attacks >= 4);
    }

    #[test]
    fn test_null_state_exits_current() {
        let mut world = FakeWorld::new(9).with_foe_in_range();
        change_state(&mut world, BOT, Some(BehaviorState::attack()));
        world.log.clear();

        change_state(&mut world, BOT, None);
        assert_eq!(world.kind(), None);
        assert_eq!(world.log, vec!["resume"]);

        execute(&mut world, BOT);
        assert_eq!(world.log.len(), 1, "halted AI does nothing");
    }
}
