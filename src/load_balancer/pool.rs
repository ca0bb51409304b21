//! Provider pool management.
//!
//! # Responsibilities
//! - Hold the available and unavailable pools as immutable snapshots
//! - Serialize every mutation (register, unregister, transition) on one mutex
//! - Serve lock-free snapshot reads to the dispatch path

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::health::state::HealthState;
use crate::load_balancer::error::{BalancerError, LoadBalancerResult};
use crate::load_balancer::node::ProviderNode;
use crate::observability::metrics;
use crate::provider::ProviderId;

/// An immutable view of one pool.
pub type Snapshot = Arc<Vec<Arc<ProviderNode>>>;

/// The two partitions of registered nodes.
#[derive(Debug)]
pub struct ProviderPools {
    available: ArcSwap<Vec<Arc<ProviderNode>>>,
    unavailable: ArcSwap<Vec<Arc<ProviderNode>>>,
    /// Held by writers only. Guards no data of its own.
    write_lock: Mutex<()>,
    max_providers: usize,
}

impl ProviderPools {
    pub fn new(max_providers: usize) -> Self {
        Self {
            available: ArcSwap::from_pointee(Vec::new()),
            unavailable: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
            max_providers,
        }
    }

    pub fn max_providers(&self) -> usize {
        self.max_providers
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The mutex protects no data, so a poisoned lock is still usable.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current available pool. Single atomic load, no lock.
    pub fn available(&self) -> Snapshot {
        self.available.load_full()
    }

    /// Current unavailable pool. Single atomic load, no lock.
    pub fn unavailable(&self) -> Snapshot {
        self.unavailable.load_full()
    }

    /// Both pools as one consistent pair.
    pub fn snapshot(&self) -> (Snapshot, Snapshot) {
        let _guard = self.lock();
        (self.available(), self.unavailable())
    }

    pub fn count_available(&self) -> usize {
        self.available.load().len()
    }

    pub fn count_unavailable(&self) -> usize {
        self.unavailable.load().len()
    }

    /// Total registered nodes, summed from one consistent state.
    pub fn count_total(&self) -> usize {
        let _guard = self.lock();
        self.available.load().len() + self.unavailable.load().len()
    }

    /// Append a new node to the available pool.
    pub fn insert(&self, node: Arc<ProviderNode>) -> LoadBalancerResult<()> {
        let _guard = self.lock();
        let available = self.available.load_full();
        let unavailable = self.unavailable.load_full();

        if available.len() + unavailable.len() >= self.max_providers {
            return Err(BalancerError::CapacityExceeded {
                max: self.max_providers,
            });
        }
        if find(&available, node.id()).is_some() || find(&unavailable, node.id()).is_some() {
            return Err(BalancerError::AlreadyRegistered(node.id().clone()));
        }

        let mut next = Vec::with_capacity(available.len() + 1);
        next.extend(available.iter().cloned());
        next.push(node);
        self.available.store(Arc::new(next));
        self.publish_sizes();
        Ok(())
    }

    /// Remove the node of the given provider, looking in `available` first.
    /// Returns the removed node, or `None` if the provider is not registered.
    pub fn remove(&self, id: &ProviderId) -> Option<Arc<ProviderNode>> {
        let _guard = self.lock();
        let removed = Self::remove_from(&self.available, |n| n.id() == id)
            .or_else(|| Self::remove_from(&self.unavailable, |n| n.id() == id));
        if removed.is_some() {
            self.publish_sizes();
        }
        removed
    }

    /// Move `node` into the pool for `to`.
    ///
    /// Returns false when the node is no longer in the source pool (already
    /// moved, or unregistered since the caller took its snapshot).
    pub fn transition(&self, node: &Arc<ProviderNode>, to: HealthState) -> bool {
        let (from, into) = match to {
            HealthState::Available => (&self.unavailable, &self.available),
            HealthState::Unavailable => (&self.available, &self.unavailable),
        };

        let _guard = self.lock();
        let Some(moved) = Self::remove_from(from, |n| Arc::ptr_eq(n, node)) else {
            return false;
        };

        let current = into.load_full();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(moved);
        into.store(Arc::new(next));
        self.publish_sizes();
        true
    }

    /// Publish a copy of `pool` without the first node matching `pred`.
    /// Caller must hold the write lock.
    fn remove_from<F>(
        pool: &ArcSwap<Vec<Arc<ProviderNode>>>,
        pred: F,
    ) -> Option<Arc<ProviderNode>>
    where
        F: Fn(&Arc<ProviderNode>) -> bool,
    {
        let current = pool.load_full();
        let index = current.iter().position(pred)?;

        let mut next = Vec::with_capacity(current.len() - 1);
        next.extend(current[..index].iter().cloned());
        next.extend(current[index + 1..].iter().cloned());
        pool.store(Arc::new(next));
        Some(current[index].clone())
    }

    fn publish_sizes(&self) {
        metrics::record_pool_sizes(self.count_available(), self.count_unavailable());
    }
}

fn find(pool: &[Arc<ProviderNode>], id: &ProviderId) -> Option<usize> {
    pool.iter().position(|n| n.id() == id)
}
