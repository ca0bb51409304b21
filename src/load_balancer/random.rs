//! Uniform random load balancing strategy.

use crate::load_balancer::BalancingAlgorithm;

/// Random selector.
/// Draws from fastrand's thread-local generator, so no shared state is locked.
#[derive(Debug, Default)]
pub struct Random;

impl Random {
    pub fn new() -> Self {
        Self
    }
}

impl BalancingAlgorithm for Random {
    fn pick(&self, pool_size: usize) -> usize {
        fastrand::usize(..pool_size)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_stays_in_range() {
        let random = Random::new();
        for size in 1..16 {
            for _ in 0..100 {
                assert!(random.pick(size) < size);
            }
        }
    }

    #[test]
    fn test_random_covers_every_slot() {
        // Probability of missing a slot in 1000 draws over 4 slots is ~4 * 0.75^1000.
        let random = Random::new();
        let mut seen = [false; 4];
        for _ in 0..1000 {
            seen[random.pick(4)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
