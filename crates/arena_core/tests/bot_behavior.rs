//! Bot state machine behavior inside a running simulation.

use arena_core::prelude::*;
use arena_test_utils::fixtures::{duel, open_arena_config, vec2};

#[test]
fn test_lone_bot_only_idles_and_wanders() {
    let config = open_arena_config().with_seed(3);
    let patrol = config.patrol;
    let bounds = (config.layout.bounds_min, config.layout.bounds_max);
    let mut sim = Simulation::new(config);
    let bot = sim.spawn_bot(vec2(0, 0), true).unwrap();

    let mut saw_moving = false;
    for _ in 0..300 {
        let events = sim.tick();
        assert!(events.kills().next().is_none());
        assert_eq!(sim.projectiles().count(), 0);

        let Some(BehaviorState::Patrol(state)) = sim.bot_state(bot) else {
            panic!("lone bot left patrol");
        };
        match state.phase() {
            PatrolPhase::Idling => assert!(patrol.idle_duration.contains(state.duration())),
            PatrolPhase::Moving => {
                saw_moving = true;
                assert!(patrol.move_duration.contains(state.duration()));
            }
            PatrolPhase::PreparingAttack => panic!("nothing to prepare against"),
        }

        let position = sim.combatant(bot).unwrap().position;
        assert!(position.x >= bounds.0.x && position.x <= bounds.1.x);
        assert!(position.y >= bounds.0.y && position.y <= bounds.1.y);
    }
    assert!(saw_moving, "fifteen seconds is long enough to start wandering");
}

#[test]
fn test_bot_with_opponent_in_range_prepares_then_throws() {
    let mut sim = Simulation::new(open_arena_config().with_seed(11));
    let player = sim.spawn_player(vec2(4, 0)).unwrap();
    let bot = sim.spawn_bot(vec2(0, 0), true).unwrap();

    let mut prepared = false;
    let mut thrown = false;
    for _ in 0..100 {
        let events = sim.tick();
        if let Some(BehaviorState::Patrol(state)) = sim.bot_state(bot) {
            prepared |= state.phase() == PatrolPhase::PreparingAttack;
        }
        thrown |= events.events.iter().any(|e| matches!(
            e,
            SimEvent::ProjectileLaunched { owner, .. } if *owner == bot
        ));
        if thrown {
            break;
        }
    }

    assert!(prepared);
    assert!(thrown);
    assert!(sim.combatant(player).is_some());
}

#[test]
fn test_dead_bot_has_no_state() {
    let mut sim = Simulation::new(open_arena_config());
    let bot = sim.spawn_bot(vec2(0, 0), true).unwrap();
    assert_eq!(sim.bot_state(bot).map(BehaviorState::kind), Some(BehaviorKind::Patrol));

    sim.kill_combatant(bot).unwrap();
    assert!(sim.bot_state(bot).is_none());

    for _ in 0..10 {
        sim.tick();
        assert!(sim.bot_state(bot).is_none());
        assert_eq!(sim.combatant(bot).unwrap().animation(), Some(Animation::Dead));
    }
}

#[test]
fn test_bot_without_ai_stays_put() {
    let mut d = duel(open_arena_config(), vec2(20, 20), vec2(0, 0));
    for _ in 0..100 {
        d.sim.tick();
    }
    assert_eq!(d.sim.combatant(d.bot).unwrap().position, vec2(0, 0));
    assert!(d.sim.bot_state(d.bot).is_none());
}
