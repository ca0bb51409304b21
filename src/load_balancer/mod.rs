//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! register(provider)
//!     → balancer.rs (wrap in ProviderNode)
//!     → pool.rs (publish new available snapshot under the write lock)
//!
//! get()
//!     → pool.rs (load available snapshot, no lock)
//!     → Apply balancing algorithm:
//!         - round_robin.rs (CAS-advanced cursor)
//!         - random.rs (uniform draw)
//!     → node.rs (admission guard, forward to provider)
//!     → Return provider identifier or error
//! ```
//!
//! # Design Decisions
//! - Pools are immutable snapshots swapped atomically; dispatch never locks
//! - One mutex serializes every pool mutation
//! - Algorithms only see a pool size and return an index
//! - Admission control is per node, not global

pub mod balancer;
pub mod error;
pub mod node;
pub mod pool;
pub mod random;
pub mod round_robin;

pub use balancer::{Builder, LoadBalancer};
pub use error::{BalancerError, LoadBalancerResult};
pub use node::{AdmissionGuard, ProviderNode};
pub use pool::ProviderPools;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy that picks a slot out of the available pool.
///
/// `pick` receives a positive pool size and must return an index in
/// `0..pool_size`. It is called concurrently from every dispatching task.
pub trait BalancingAlgorithm: Send + Sync + fmt::Debug {
    fn pick(&self, pool_size: usize) -> usize;

    /// Strategy name, for logging and status output.
    fn name(&self) -> &'static str;
}

/// Built-in algorithms, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    #[default]
    RoundRobin,
    Random,
}

impl AlgorithmKind {
    /// Create a fresh algorithm instance. Each balancer gets its own state.
    pub fn build(self) -> Box<dyn BalancingAlgorithm> {
        match self {
            AlgorithmKind::RoundRobin => Box::new(round_robin::RoundRobin::new()),
            AlgorithmKind::Random => Box::new(random::Random::new()),
        }
    }
}
