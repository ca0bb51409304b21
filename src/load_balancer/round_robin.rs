//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::BalancingAlgorithm;

/// Round-robin selector.
/// Keeps one shared cursor and advances it with a compare-and-swap.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalancingAlgorithm for RoundRobin {
    fn pick(&self, pool_size: usize) -> usize {
        let mut current = self.cursor.load(Ordering::Relaxed);
        loop {
            // A cursor past the end (pool shrank) wraps to the front.
            let index = if current >= pool_size { 0 } else { current };
            match self.cursor.compare_exchange_weak(
                current,
                index + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return index,
                Err(observed) => current = observed,
            }
        }
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}
