//! Navigation seam.
//!
//! Bots move through a [`Navigation`] service: the simulation sets
//! destinations and asks the service to advance agents each tick. The
//! built-in [`DirectNavigation`] walks straight lines inside the layout
//! bounds, which is enough for an open arena.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::components::EntityId;
use crate::math::{Fixed, Vec2Fixed};

/// Path-following service for bots.
pub trait Navigation: Debug {
    /// Start tracking an agent.
    fn add_agent(&mut self, agent: EntityId, speed: Fixed);

    /// Stop tracking an agent.
    fn remove_agent(&mut self, agent: EntityId);

    /// Forget every agent.
    fn clear(&mut self);

    /// Enable or disable an agent. Disabled agents ignore movement requests.
    fn set_enabled(&mut self, agent: EntityId, enabled: bool);

    /// Whether the agent exists and is enabled.
    fn is_enabled(&self, agent: EntityId) -> bool;

    /// Set a destination and un-stop the agent.
    fn set_destination(&mut self, agent: EntityId, destination: Vec2Fixed);

    /// Halt the agent and zero its velocity.
    fn stop(&mut self, agent: EntityId);

    /// Continue toward the current destination.
    fn resume(&mut self, agent: EntityId);

    /// Velocity from the last advance.
    fn velocity(&self, agent: EntityId) -> Vec2Fixed;

    /// Move the agent for `dt` seconds and return its new position.
    fn advance(&mut self, agent: EntityId, position: Vec2Fixed, dt: Fixed) -> Vec2Fixed;

    /// Nearest navigable point within `max_distance` of `point`.
    fn sample_position(&self, point: Vec2Fixed, max_distance: Fixed) -> Option<Vec2Fixed>;

    /// Whether a point is on the navigable surface.
    fn is_navigable(&self, point: Vec2Fixed) -> bool;
}

#[derive(Debug, Clone)]
struct Agent {
    speed: Fixed,
    destination: Option<Vec2Fixed>,
    velocity: Vec2Fixed,
    stopped: bool,
    enabled: bool,
}

/// Straight-line navigation inside a rectangle.
#[derive(Debug, Clone)]
pub struct DirectNavigation {
    min: Vec2Fixed,
    max: Vec2Fixed,
    agents: BTreeMap<EntityId, Agent>,
}

impl DirectNavigation {
    /// Create navigation over the rectangle `min..=max`.
    #[must_use]
    pub fn new(min: Vec2Fixed, max: Vec2Fixed) -> Self {
        Self {
            min,
            max,
            agents: BTreeMap::new(),
        }
    }

    fn clamp(&self, point: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Destination of an agent, if one is set.
    #[must_use]
    pub fn destination(&self, agent: EntityId) -> Option<Vec2Fixed> {
        self.agents.get(&agent).and_then(|a| a.destination)
    }
}

impl Navigation for DirectNavigation {
    fn add_agent(&mut self, agent: EntityId, speed: Fixed) {
        self.agents.insert(
            agent,
            Agent {
                speed,
                destination: None,
                velocity: Vec2Fixed::ZERO,
                stopped: false,
                enabled: true,
            },
        );
    }

    fn remove_agent(&mut self, agent: EntityId) {
        self.agents.remove(&agent);
    }

    fn clear(&mut self) {
        self.agents.clear();
    }

    fn set_enabled(&mut self, agent: EntityId, enabled: bool) {
        if let Some(a) = self.agents.get_mut(&agent) {
            a.enabled = enabled;
            if !enabled {
                a.velocity = Vec2Fixed::ZERO;
            }
        }
    }

    fn is_enabled(&self, agent: EntityId) -> bool {
        self.agents.get(&agent).is_some_and(|a| a.enabled)
    }

    fn set_destination(&mut self, agent: EntityId, destination: Vec2Fixed) {
        let clamped = self.clamp(destination);
        if let Some(a) = self.agents.get_mut(&agent).filter(|a| a.enabled) {
            a.destination = Some(clamped);
            a.stopped = false;
        }
    }

    fn stop(&mut self, agent: EntityId) {
        if let Some(a) = self.agents.get_mut(&agent).filter(|a| a.enabled) {
            a.stopped = true;
            a.velocity = Vec2Fixed::ZERO;
        }
    }

    fn resume(&mut self, agent: EntityId) {
        if let Some(a) = self.agents.get_mut(&agent).filter(|a| a.enabled) {
            a.stopped = false;
        }
    }

    fn velocity(&self, agent: EntityId) -> Vec2Fixed {
        self.agents
            .get(&agent)
            .map_or(Vec2Fixed::ZERO, |a| a.velocity)
    }

    fn advance(&mut self, agent: EntityId, position: Vec2Fixed, dt: Fixed) -> Vec2Fixed {
        let Some(a) = self.agents.get_mut(&agent) else {
            return position;
        };
        let destination = match a.destination {
            Some(d) if a.enabled && !a.stopped => d,
            _ => {
                a.velocity = Vec2Fixed::ZERO;
                return position;
            }
        };

        let to_go = destination - position;
        let remaining = to_go.length();
        if remaining == Fixed::ZERO {
            a.velocity = Vec2Fixed::ZERO;
            return position;
        }

        let direction = to_go.normalize();
        let step = (a.speed * dt).min(remaining);
        a.velocity = direction.scale(a.speed);
        if step == remaining {
            destination
        } else {
            position + direction.scale(step)
        }
    }

    fn sample_position(&self, point: Vec2Fixed, max_distance: Fixed) -> Option<Vec2Fixed> {
        let snapped = self.clamp(point);
        (snapped.distance_squared(point) <= max_distance * max_distance).then_some(snapped)
    }

    fn is_navigable(&self, point: Vec2Fixed) -> bool {
        self.clamp(point) == point
    }
}
