//! Nearest-target queries.

use crate::components::{Combatant, EntityId, LayerMask};
use crate::math::{Fixed, Vec2Fixed};

/// Parameters for a nearest-target search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetQuery {
    /// Search origin.
    pub origin: Vec2Fixed,
    /// Inclusive search radius; `None` searches the whole arena.
    pub radius: Option<Fixed>,
    /// Combatant to skip, normally the searcher itself.
    pub exclude: Option<EntityId>,
    /// Layers a candidate must be on.
    pub layers: LayerMask,
}

impl TargetQuery {
    /// Opponents of `searcher` within its current range.
    #[must_use]
    pub fn opponents_of(searcher: &Combatant) -> Self {
        Self {
            origin: searcher.position,
            radius: Some(searcher.range()),
            exclude: Some(searcher.id),
            layers: searcher.target_layers,
        }
    }

    /// Every other combatant, at any distance.
    #[must_use]
    pub fn anyone_but(searcher: &Combatant) -> Self {
        Self {
            origin: searcher.position,
            radius: None,
            exclude: Some(searcher.id),
            layers: LayerMask::ALL,
        }
    }

    fn admits(&self, candidate: &Combatant) -> Option<Fixed> {
        if !candidate.is_alive()
            || self.exclude == Some(candidate.id)
            || !self.layers.matches(candidate.layer())
        {
            return None;
        }
        let dist_sq = self.origin.distance_squared(candidate.position);
        match self.radius {
            Some(r) if dist_sq > r.saturating_mul(r) => None,
            _ => Some(dist_sq),
        }
    }
}

/// Find the closest live candidate matching the query.
///
/// Candidates are compared by squared distance with a strict `<`, so on a
/// tie the first candidate seen wins. Callers iterate in id order to keep
/// the choice deterministic.
pub fn find_nearest_target<'a, I>(candidates: I, query: &TargetQuery) -> Option<EntityId>
where
    I: IntoIterator<Item = &'a Combatant>,
{
    let mut best: Option<(Fixed, EntityId)> = None;
    for candidate in candidates {
        let Some(dist_sq) = query.admits(candidate) else {
            continue;
        };
        if best.map_or(true, |(best_sq, _)| dist_sq < best_sq) {
            best = Some((dist_sq, candidate.id));
        }
    }
    best.map(|(_, id)| id)
}
