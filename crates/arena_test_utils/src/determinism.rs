//! Replay checks for the arena simulation.
//!
//! A level built from the same config and seed, fed the same player inputs,
//! must reach the same [`Simulation::state_hash`] on every run and thread.
//! Fixed-point math, id-ordered maps and the level's own
//! [`arena_core::rng::SimRng`] are what make that hold.

use std::thread;

use arena_core::player::PlayerInput;
use arena_core::simulation::Simulation;

/// Final state hash of one scripted run.
///
/// Input `i` is held during tick `i`; the last input stays held for any
/// remaining ticks.
pub fn scripted_hash<F>(setup: F, inputs: &[PlayerInput], ticks: u64) -> u64
where
    F: FnOnce() -> Simulation,
{
    let mut sim = setup();
    let mut script = inputs.iter();
    for _ in 0..ticks {
        if let Some(&input) = script.next() {
            sim.set_player_input(input);
        }
        sim.tick();
    }
    sim.state_hash()
}

/// Run the same script `runs` times and panic unless every hash matches.
///
/// # Panics
///
/// Panics with the per-run hashes when any run ends differently.
pub fn assert_replays_identically<F>(setup: F, inputs: &[PlayerInput], ticks: u64, runs: usize)
where
    F: Fn() -> Simulation,
{
    let hashes: Vec<u64> = (0..runs).map(|_| scripted_hash(&setup, inputs, ticks)).collect();
    assert!(
        hashes.windows(2).all(|w| w[0] == w[1]),
        "level replayed differently after {ticks} ticks: {hashes:x?}"
    );
}

/// Step `runs` levels on scoped threads and return their final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn parallel_hashes<F>(setup: F, runs: usize, ticks: u64) -> Vec<u64>
where
    F: Fn() -> Simulation + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| s.spawn(|| scripted_hash(&setup, &[], ticks)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    })
}

/// First tick at which two fresh levels differ in events or state.
///
/// Tick 0 means the levels already differ before stepping.
pub fn first_divergence<F>(setup: F, ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut a = setup();
    let mut b = setup();
    if a.state_hash() != b.state_hash() {
        return Some(0);
    }
    (1..=ticks).find(|_| a.tick() != b.tick() || a.state_hash() != b.state_hash())
}

/// Proptest strategies for simulation inputs.
pub mod strategies {
    use arena_core::math::{Fixed, Vec2Fixed};
    use arena_core::player::PlayerInput;
    use proptest::prelude::*;

    /// Fixed-point coordinate inside the default arena bounds.
    pub fn arb_coordinate() -> impl Strategy<Value = Fixed> {
        (-30i32..=30i32).prop_map(Fixed::from_num)
    }

    /// Position inside the default arena bounds.
    pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Simulation seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// A single player input.
    pub fn arb_player_input() -> impl Strategy<Value = PlayerInput> {
        prop_oneof![
            Just(PlayerInput::Idle),
            Just(PlayerInput::Release),
            (-1i32..=1, -1i32..=1).prop_map(|(x, y)| PlayerInput::Move(Vec2Fixed::from_ints(x, y))),
        ]
    }

    /// A script of player inputs, one per tick.
    pub fn arb_input_script(max_len: usize) -> impl Strategy<Value = Vec<PlayerInput>> {
        prop::collection::vec(arb_player_input(), 1..=max_len)
    }
}
