//! Thrown weapons in flight.
//!
//! A projectile travels in a straight line fixed at launch. Each tick it is
//! swept along its path; the first valid contact decides its fate, and it
//! expires once it has covered its maximum distance.

use crate::components::{Combatant, EntityId, LayerMask, WeaponKind};
use crate::config::{Obstacle, WeaponConfig};
use crate::math::{Fixed, Vec2Fixed};

/// Result of advancing a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    /// Still travelling.
    Flying,
    /// Reached its maximum distance.
    Expired,
}

/// What a swept projectile ran into first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// A combatant that can be struck.
    Combatant(EntityId),
    /// An obstacle.
    Obstacle,
}

/// A weapon in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projectile {
    /// Pool-issued identifier.
    pub id: EntityId,
    /// Thrower, cleared when the projectile despawns.
    pub owner: Option<EntityId>,
    /// Weapon kind, which selects the pool.
    pub weapon: WeaponKind,
    /// Layers the projectile may hit.
    pub target_layers: LayerMask,
    /// Launch point.
    pub origin: Vec2Fixed,
    /// Current position.
    pub position: Vec2Fixed,
    /// Flight speed in units per second.
    pub speed: Fixed,
    /// Distance after which the projectile expires.
    pub max_distance: Fixed,
    /// Collision radius.
    pub radius: Fixed,
    direction: Vec2Fixed,
    traveled: Fixed,
    flying: bool,
}

impl Projectile {
    /// Launch from `origin` toward `aim_point`.
    ///
    /// The direction is captured once; later movement of the target does
    /// not steer the projectile.
    #[must_use]
    pub fn launch(
        id: EntityId,
        owner: Option<EntityId>,
        origin: Vec2Fixed,
        aim_point: Vec2Fixed,
        target_layers: LayerMask,
        stats: &WeaponConfig,
    ) -> Self {
        Self {
            id,
            owner,
            weapon: stats.kind,
            target_layers,
            origin,
            position: origin,
            speed: stats.speed,
            max_distance: stats.max_distance,
            radius: stats.radius,
            direction: (aim_point - origin).normalize(),
            traveled: Fixed::ZERO,
            flying: true,
        }
    }

    /// Unit flight direction.
    #[must_use]
    pub const fn direction(&self) -> Vec2Fixed {
        self.direction
    }

    /// Distance covered so far.
    #[must_use]
    pub const fn traveled(&self) -> Fixed {
        self.traveled
    }

    /// Whether the projectile is still in flight.
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.flying
    }

    /// Stop flight and detach from the owner.
    pub fn ground(&mut self) {
        self.flying = false;
        self.owner = None;
    }

    /// Move along the flight line for `dt` seconds.
    ///
    /// The step is clamped so the projectile stops exactly at its maximum
    /// distance.
    pub fn advance(&mut self, dt: Fixed) -> FlightStatus {
        if !self.flying {
            return FlightStatus::Expired;
        }
        let remaining = (self.max_distance - self.traveled).max(Fixed::ZERO);
        let step = (self.speed * dt).min(remaining);
        self.position += self.direction.scale(step);
        self.traveled += step;

        if self.traveled >= self.max_distance {
            FlightStatus::Expired
        } else {
            FlightStatus::Flying
        }
    }

    /// Whether this projectile may strike `combatant`.
    ///
    /// The owner and dead combatants are passed through. An ownerless
    /// projectile strikes any live combatant.
    #[must_use]
    pub fn can_strike(&self, combatant: &Combatant) -> bool {
        if !combatant.is_alive() {
            return false;
        }
        match self.owner {
            Some(owner) => owner != combatant.id && self.target_layers.matches(combatant.layer()),
            None => true,
        }
    }

    /// First contact along the segment `from..self.position`.
    ///
    /// Contacts are ordered by how far along the segment they occur.
    /// Combatants are checked before obstacles and in iteration order, so
    /// the earliest-seen contact wins a tie.
    pub fn first_contact<'a, I>(&self, from: Vec2Fixed, combatants: I, obstacles: &[Obstacle]) -> Option<Contact>
    where
        I: IntoIterator<Item = &'a Combatant>,
    {
        let to = self.position;
        let mut best: Option<(Fixed, Contact)> = None;
        let mut consider = |t: Fixed, contact: Contact| {
            if best.map_or(true, |(best_t, _)| t < best_t) {
                best = Some((t, contact));
            }
        };

        for combatant in combatants {
            if !self.can_strike(combatant) {
                continue;
            }
            let reach = combatant.hit_radius() + self.radius;
            let (dist_sq, t) = combatant.position.distance_squared_to_segment(from, to);
            if dist_sq <= reach * reach {
                consider(t, Contact::Combatant(combatant.id));
            }
        }

        for obstacle in obstacles {
            let reach = obstacle.radius + self.radius;
            let (dist_sq, t) = obstacle.center.distance_squared_to_segment(from, to);
            if dist_sq <= reach * reach {
                consider(t, Contact::Obstacle);
            }
        }

        best.map(|(_, contact)| contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CombatantKind;
    use crate::config::CombatantConfig;

    fn axe() -> WeaponConfig {
        WeaponConfig::standard(WeaponKind::Axe)
    }

    fn combatant(slot: u32, x: i32, y: i32) -> Combatant {
        Combatant::new(
            EntityId::new(slot, 0),
            CombatantKind::Bot,
            Vec2Fixed::from_ints(x, y),
            &CombatantConfig::default(),
        )
    }

    fn thrown_by(owner: &Combatant, aim: Vec2Fixed) -> Projectile {
        Projectile::launch(
            EntityId::new(100, 0),
            Some(owner.id),
            owner.position,
            aim,
            owner.target_layers,
            &axe(),
        )
    }

    #[test]
    fn test_launch_direction_is_normalized() {
        let owner = combatant(0, 0, 0);
        let p = thrown_by(&owner, Vec2Fixed::from_ints(0, 8));
        assert_eq!(p.direction(), Vec2Fixed::from_ints(0, 1));
        assert!(p.is_flying());
    }

    #[test]
    fn test_advance_moves_at_speed() {
        let owner = combatant(0, 0, 0);
        let mut p = thrown_by(&owner, Vec2Fixed::from_ints(5, 0));
        assert_eq!(p.advance(Fixed::from_num(0.25)), FlightStatus::Flying);
        assert_eq!(p.position, Vec2Fixed::new(Fixed::from_num(3.75), Fixed::ZERO));
        assert_eq!(p.traveled(), Fixed::from_num(3.75));
    }

    #[test]
    fn test_expires_exactly_at_max_distance() {
        let owner = combatant(0, 0, 0);
        let mut p = thrown_by(&owner, Vec2Fixed::from_ints(1, 0));
        assert_eq!(p.advance(Fixed::ONE), FlightStatus::Flying);
        assert_eq!(p.advance(Fixed::ONE), FlightStatus::Expired);
        assert_eq!(p.traveled(), Fixed::from_num(20));
        assert_eq!(p.position, Vec2Fixed::from_ints(20, 0));
    }

    #[test]
    fn test_owner_and_dead_are_ignored() {
        let owner = combatant(0, 0, 0);
        let mut dead = combatant(1, 2, 0);
        dead.mark_dead();
        let mut p = thrown_by(&owner, Vec2Fixed::from_ints(5, 0));
        p.advance(Fixed::ONE / Fixed::from_num(5));

        let roster = [owner.clone(), dead];
        assert_eq!(p.first_contact(owner.position, &roster, &[]), None);
    }

    #[test]
    fn test_nearest_contact_along_path_wins() {
        let owner = combatant(0, 0, 0);
        let far = combatant(1, 4, 0);
        let near = combatant(2, 2, 0);
        let mut p = thrown_by(&owner, Vec2Fixed::from_ints(5, 0));
        p.advance(Fixed::ONE / Fixed::from_num(3));

        let roster = [owner.clone(), far, near];
        assert_eq!(
            p.first_contact(owner.position, &roster, &[]),
            Some(Contact::Combatant(EntityId::new(2, 0)))
        );
    }

    #[test]
    fn test_obstacle_in_front_blocks() {
        let owner = combatant(0, 0, 0);
        let behind_wall = combatant(1, 4, 0);
        let wall = Obstacle {
            center: Vec2Fixed::from_ints(2, 0),
            radius: Fixed::from_num(0.5),
        };
        let mut p = thrown_by(&owner, Vec2Fixed::from_ints(5, 0));
        p.advance(Fixed::ONE / Fixed::from_num(3));

        let roster = [owner.clone(), behind_wall];
        assert_eq!(
            p.first_contact(owner.position, &roster, &[wall]),
            Some(Contact::Obstacle)
        );
    }

    #[test]
    fn test_layer_mismatch_passes_through() {
        let mut owner = combatant(0, 0, 0);
        owner.target_layers = LayerMask::PLAYER;
        let other_bot = combatant(1, 2, 0);
        let mut p = thrown_by(&owner, Vec2Fixed::from_ints(5, 0));
        p.advance(Fixed::ONE / Fixed::from_num(3));

        assert!(!p.can_strike(&other_bot));
        let roster = [owner.clone(), other_bot];
        assert_eq!(p.first_contact(owner.position, &roster, &[]), None);
    }

    #[test]
    fn test_ownerless_strikes_anyone_alive() {
        let owner = combatant(0, 0, 0);
        let mut p = thrown_by(&owner, Vec2Fixed::from_ints(5, 0));
        p.ground();
        assert!(!p.is_flying());
        assert!(p.owner.is_none());
        assert!(p.can_strike(&owner));
    }
}
