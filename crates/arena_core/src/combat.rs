//! Attack gating.
//!
//! A combatant may attack when it is alive and its cooldown has elapsed.
//! Starting an attack stamps the attack time and turns the attacker toward
//! its target; the returned [`AttackOrder`] describes the throw the
//! simulation then spawns.

use crate::components::{Combatant, EntityId, LayerMask, WeaponKind};
use crate::math::{Fixed, Vec2Fixed};

/// A throw ready to be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOrder {
    /// Thrower.
    pub attacker: EntityId,
    /// Weapon thrown.
    pub weapon: WeaponKind,
    /// Launch point.
    pub origin: Vec2Fixed,
    /// Point aimed at.
    pub aim_point: Vec2Fixed,
    /// Layers the projectile may hit.
    pub target_layers: LayerMask,
}

/// Whether `combatant` may attack at time `now`.
#[must_use]
pub fn can_attack(combatant: &Combatant, now: Fixed) -> bool {
    combatant.is_alive() && now >= combatant.last_attack_time() + combatant.attack_cooldown
}

/// Start an attack toward `aim_point`.
///
/// Returns `None` without touching the attacker when it cannot attack.
pub fn begin_attack(
    attacker: &mut Combatant,
    aim_point: Vec2Fixed,
    now: Fixed,
) -> Option<AttackOrder> {
    if !can_attack(attacker, now) {
        return None;
    }

    attacker.stamp_attack(now);
    attacker.face_toward(aim_point);

    Some(AttackOrder {
        attacker: attacker.id,
        weapon: attacker.weapon,
        origin: attacker.position,
        aim_point,
        target_layers: attacker.target_layers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CombatantKind;
    use crate::config::CombatantConfig;

    fn attacker() -> Combatant {
        Combatant::new(
            EntityId::new(0, 0),
            CombatantKind::Bot,
            Vec2Fixed::ZERO,
            &CombatantConfig::default(),
        )
    }

    #[test]
    fn test_fresh_combatant_can_attack_at_time_zero() {
        assert!(can_attack(&attacker(), Fixed::ZERO));
    }

    #[test]
    fn test_cooldown_blocks_second_attack() {
        let mut a = attacker();
        let now = Fixed::from_num(10);
        let target = Vec2Fixed::from_ints(5, 0);

        let order = begin_attack(&mut a, target, now).unwrap();
        assert_eq!(order.origin, Vec2Fixed::ZERO);
        assert_eq!(a.last_attack_time(), now);
        assert_eq!(a.facing, Vec2Fixed::from_ints(1, 0));

        assert!(begin_attack(&mut a, target, now).is_none());
        assert!(begin_attack(&mut a, target, now + Fixed::from_num(1.99)).is_none());
        assert!(begin_attack(&mut a, target, now + Fixed::from_num(2)).is_some());
    }

    #[test]
    fn test_dead_combatant_cannot_attack() {
        let mut a = attacker();
        a.mark_dead();
        assert!(!can_attack(&a, Fixed::from_num(100)));
        assert!(begin_attack(&mut a, Vec2Fixed::from_ints(1, 0), Fixed::from_num(100)).is_none());
        assert_eq!(a.last_attack_time(), -Fixed::from_num(2));
    }
}
