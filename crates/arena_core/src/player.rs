//! Player controller.
//!
//! Input arrives as a [`PlayerInput`] held until replaced. Holding a
//! direction moves the player; releasing throws at the nearest opponent in
//! range. The controller only decides what to do; the simulation carries it
//! out.

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec2Fixed};

/// Joystick-style input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerInput {
    /// No input.
    #[default]
    Idle,
    /// Stick held in a direction. Magnitudes above 1 are clamped.
    Move(Vec2Fixed),
    /// Stick released; attempt a throw. Consumed by one tick.
    Release,
}

/// What the player does this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerIntent {
    /// Move along a direction with magnitude at most 1.
    Move(Vec2Fixed),
    /// Throw at the nearest opponent if possible.
    Attack,
    /// Play the idle animation.
    Rest,
}

/// Movement and attack flags of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerController {
    input: PlayerInput,
    moving: bool,
    attacking: bool,
}

impl PlayerController {
    /// Replace the held input.
    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    /// Currently held input.
    #[must_use]
    pub const fn input(&self) -> PlayerInput {
        self.input
    }

    /// Whether the player is moving.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether a throw animation is playing.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Decide this tick's action from the held input.
    pub fn next_intent(&mut self) -> Option<PlayerIntent> {
        match self.input {
            PlayerInput::Move(direction) => {
                self.moving = true;
                self.attacking = false;
                Some(PlayerIntent::Move(clamp_unit(direction)))
            }
            PlayerInput::Release => {
                self.input = PlayerInput::Idle;
                self.moving = false;
                Some(PlayerIntent::Attack)
            }
            PlayerInput::Idle => {
                self.moving = false;
                (!self.attacking).then_some(PlayerIntent::Rest)
            }
        }
    }

    /// Record whether a throw started.
    pub fn attack_resolved(&mut self, started: bool) {
        self.attacking = started;
    }

    /// End the throw animation. Returns `false` if the player moved meanwhile.
    pub fn finish_attack(&mut self) -> bool {
        if self.moving {
            return false;
        }
        self.attacking = false;
        true
    }

    /// Clear all flags and input.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn clamp_unit(direction: Vec2Fixed) -> Vec2Fixed {
    if direction.dot(direction) > Fixed::ONE {
        direction.normalize()
    } else {
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_sets_moving() {
        let mut c = PlayerController::default();
        c.set_input(PlayerInput::Move(Vec2Fixed::from_ints(1, 0)));
        assert_eq!(c.next_intent(), Some(PlayerIntent::Move(Vec2Fixed::from_ints(1, 0))));
        assert!(c.is_moving());
    }

    #[test]
    fn test_long_stick_is_clamped() {
        let mut c = PlayerController::default();
        c.set_input(PlayerInput::Move(Vec2Fixed::from_ints(0, 3)));
        assert_eq!(c.next_intent(), Some(PlayerIntent::Move(Vec2Fixed::from_ints(0, 1))));
    }

    #[test]
    fn test_release_is_consumed_once() {
        let mut c = PlayerController::default();
        c.set_input(PlayerInput::Move(Vec2Fixed::from_ints(1, 0)));
        c.next_intent();
        c.set_input(PlayerInput::Release);
        assert_eq!(c.next_intent(), Some(PlayerIntent::Attack));
        assert!(!c.is_moving());
        assert_eq!(c.input(), PlayerInput::Idle);
        c.attack_resolved(true);
        assert!(c.is_attacking());
        assert_eq!(c.next_intent(), None, "attacking player does not idle");
        assert!(c.finish_attack());
        assert_eq!(c.next_intent(), Some(PlayerIntent::Rest));
    }

    #[test]
    fn test_finish_attack_while_moving_keeps_running() {
        let mut c = PlayerController::default();
        c.set_input(PlayerInput::Release);
        c.next_intent();
        c.attack_resolved(true);
        c.set_input(PlayerInput::Move(Vec2Fixed::from_ints(1, 0)));
        c.next_intent();
        assert!(!c.is_attacking());
        assert!(!c.finish_attack());
    }
}
