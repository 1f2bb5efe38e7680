//! Seeded random source for the simulation.
//!
//! Every simulation instance owns exactly one [`SimRng`]. All randomized
//! behavior (phase durations, coin flips, wander points, spawn shuffles)
//! draws from it, so two simulations built with the same seed and fed the
//! same inputs stay identical tick for tick.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::{Fixed, Vec2Fixed};

/// Deterministic random number generator.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SimRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[min, max]`.
    ///
    /// Sampled on the raw fixed-point bits, so no floating point is
    /// involved. A degenerate range returns `min`.
    pub fn range(&mut self, min: Fixed, max: Fixed) -> Fixed {
        if max <= min {
            return min;
        }
        Fixed::from_bits(self.rng.gen_range(min.to_bits()..=max.to_bits()))
    }

    /// Returns true with the given probability (`0..=1`).
    pub fn chance(&mut self, probability: Fixed) -> bool {
        if probability <= Fixed::ZERO {
            return false;
        }
        if probability >= Fixed::ONE {
            return true;
        }
        // Uniform in [0, 1): compare against raw fractional bits.
        let roll = Fixed::from_bits(i64::from(self.rng.gen::<u32>()));
        roll < probability
    }

    /// Uniform index in `[0, len)`. Returns `None` for an empty range.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    /// In-place Fisher–Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in 0..items.len() {
            let j = self.rng.gen_range(i..items.len());
            items.swap(i, j);
        }
    }

    /// Uniformly distributed point inside the unit disc.
    pub fn point_in_unit_disc(&mut self) -> Vec2Fixed {
        let lo = -Fixed::ONE;
        loop {
            let candidate = Vec2Fixed::new(self.range(lo, Fixed::ONE), self.range(lo, Fixed::ONE));
            if candidate.dot(candidate) <= Fixed::ONE {
                return candidate;
            }
        }
    }

    /// Random unit-length horizontal direction.
    pub fn unit_direction(&mut self) -> Vec2Fixed {
        let min_len_sq = Fixed::ONE / Fixed::from_num(100);
        loop {
            let candidate = self.point_in_unit_disc();
            if candidate.dot(candidate) >= min_len_sq {
                return candidate.normalize();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..100 {
            assert_eq!(
                a.range(Fixed::ONE, Fixed::from_num(3)),
                b.range(Fixed::ONE, Fixed::from_num(3))
            );
        }
    }

    #[test]
    fn test_range_stays_inside_bounds() {
        let mut rng = SimRng::new(1);
        let (min, max) = (Fixed::from_num(2), Fixed::from_num(5));
        for _ in 0..1000 {
            let v = rng.range(min, max);
            assert!(v >= min && v <= max, "{v} outside [{min}, {max}]");
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let mut rng = SimRng::new(1);
        assert_eq!(rng.range(Fixed::ONE, Fixed::ONE), Fixed::ONE);
        assert_eq!(rng.range(Fixed::from_num(3), Fixed::ONE), Fixed::from_num(3));
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SimRng::new(3);
        for _ in 0..100 {
            assert!(!rng.chance(Fixed::ZERO));
            assert!(rng.chance(Fixed::ONE));
        }
    }

    #[test]
    fn test_coin_flip_is_roughly_fair() {
        let mut rng = SimRng::new(11);
        let heads = (0..2000).filter(|_| rng.chance(Fixed::from_num(0.5))).count();
        assert!((800..1200).contains(&heads), "heads = {heads}");
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SimRng::new(5);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_unit_direction_has_unit_length() {
        let mut rng = SimRng::new(9);
        let eps = Fixed::ONE / Fixed::from_num(1000);
        for _ in 0..50 {
            let d = rng.unit_direction();
            assert!((d.length() - Fixed::ONE).abs() < eps);
        }
    }

    #[test]
    fn test_index_empty() {
        let mut rng = SimRng::new(0);
        assert_eq!(rng.index(0), None);
        assert!(rng.index(4).unwrap() < 4);
    }
}
