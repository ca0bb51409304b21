//! Provider node: one registered provider plus its scheduling metadata.
//!
//! # Responsibilities
//! - Wrap a single shared provider
//! - Track in-flight requests and enforce the per-node ceiling
//! - Track the consecutive successful probes used for recovery

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::load_balancer::error::{BalancerError, LoadBalancerResult};
use crate::provider::{Provider, ProviderId};
use crate::resilience::timeouts::with_optional_timeout;

/// Success-streak value of a node that has never failed a probe.
pub const NEVER_FAILED: usize = usize::MAX;

/// A registered provider.
pub struct ProviderNode {
    provider: Arc<dyn Provider>,
    /// Maximum concurrent requests allowed.
    max_load: usize,
    /// Number of requests currently being served.
    in_flight: AtomicUsize,
    /// Consecutive successful probes since the last failure.
    consecutive_successes: AtomicUsize,
}

impl ProviderNode {
    pub fn new(provider: Arc<dyn Provider>, max_load: usize) -> Self {
        Self {
            provider,
            max_load,
            in_flight: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(NEVER_FAILED),
        }
    }

    pub fn id(&self) -> &ProviderId {
        self.provider.id()
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn max_load(&self) -> usize {
        self.max_load
    }

    /// Get the current number of in-flight requests.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Try to take an admission slot. The slot is released when the guard drops.
    pub fn try_admit(self: &Arc<Self>) -> Option<AdmissionGuard> {
        let mut prev = self.in_flight.load(Ordering::Relaxed);
        loop {
            if prev >= self.max_load {
                return None;
            }
            match self.in_flight.compare_exchange_weak(
                prev,
                prev + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => prev = x,
            }
        }
        Some(AdmissionGuard { node: self.clone() })
    }

    /// Admit one request and forward it to the provider.
    ///
    /// Fails with `TooManyRequests` without touching the provider when the node
    /// is saturated. The slot is held until the provider answers, the timeout
    /// fires, or the returned future is dropped.
    pub async fn try_dispatch(
        self: &Arc<Self>,
        timeout: Option<Duration>,
    ) -> LoadBalancerResult<ProviderId> {
        let _guard = self
            .try_admit()
            .ok_or_else(|| BalancerError::TooManyRequests(self.id().clone()))?;

        with_optional_timeout(timeout, self.provider.identify())
            .await
            .map_err(|elapsed| BalancerError::DispatchTimeout {
                provider: self.id().clone(),
                timeout: elapsed,
            })
    }

    // --- Health streak ---

    pub fn consecutive_successes(&self) -> usize {
        self.consecutive_successes.load(Ordering::Acquire)
    }

    /// Record a successful probe. Returns the streak before this success.
    pub fn record_success(&self) -> usize {
        match self.consecutive_successes.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |n| Some(n.saturating_add(1)),
        ) {
            Ok(prev) | Err(prev) => prev,
        }
    }

    /// Break the success streak.
    pub fn reset_successes(&self) {
        self.consecutive_successes.store(0, Ordering::Release);
    }
}

impl fmt::Debug for ProviderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderNode")
            .field("id", self.id())
            .field("max_load", &self.max_load)
            .field("in_flight", &self.in_flight())
            .field("consecutive_successes", &self.consecutive_successes())
            .finish()
    }
}

/// A RAII guard holding one admission slot on a node.
#[derive(Debug)]
pub struct AdmissionGuard {
    node: Arc<ProviderNode>,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.node.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
