//! Deferred actions keyed by simulation time.
//!
//! Delayed effects (despawning a dead bot, showing a weapon again, ending
//! the player's throw animation) are queued here and drained at the end of
//! each tick once their wake time has passed. Tasks with equal wake times
//! run in the order they were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::components::EntityId;
use crate::math::Fixed;

/// An action to run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Award coins, notify the spawn director and return a dead bot to its pool.
    DespawnBot(EntityId),
    /// Show the weapon in a combatant's hand again.
    ShowWeapon(EntityId),
    /// Drop the player back to idle after a throw.
    PlayerIdle(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    wake: Fixed,
    seq: u64,
    task: DeferredTask,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wake.cmp(&other.wake).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Time-ordered queue of deferred tasks.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl DeferredQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task to run once the clock reaches `wake`.
    pub fn schedule(&mut self, wake: Fixed, task: DeferredTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { wake, seq, task }));
    }

    /// Pop the earliest task due at `now`.
    pub fn pop_due(&mut self, now: Fixed) -> Option<DeferredTask> {
        if self.heap.peek().is_some_and(|Reverse(s)| s.wake <= now) {
            self.heap.pop().map(|Reverse(s)| s.task)
        } else {
            None
        }
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_wait_for_wake_time() {
        let mut queue = DeferredQueue::new();
        let bot = EntityId::new(2, 0);
        queue.schedule(Fixed::from_num(1.5), DeferredTask::DespawnBot(bot));

        assert_eq!(queue.pop_due(Fixed::ONE), None);
        assert_eq!(
            queue.pop_due(Fixed::from_num(1.5)),
            Some(DeferredTask::DespawnBot(bot))
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tasks_run_in_time_then_schedule_order() {
        let mut queue = DeferredQueue::new();
        let a = EntityId::new(0, 0);
        let b = EntityId::new(1, 0);
        queue.schedule(Fixed::from_num(2), DeferredTask::ShowWeapon(a));
        queue.schedule(Fixed::ONE, DeferredTask::ShowWeapon(b));
        queue.schedule(Fixed::ONE, DeferredTask::PlayerIdle(a));

        let now = Fixed::from_num(5);
        assert_eq!(queue.pop_due(now), Some(DeferredTask::ShowWeapon(b)));
        assert_eq!(queue.pop_due(now), Some(DeferredTask::PlayerIdle(a)));
        assert_eq!(queue.pop_due(now), Some(DeferredTask::ShowWeapon(a)));
        assert_eq!(queue.pop_due(now), None);
    }
}
