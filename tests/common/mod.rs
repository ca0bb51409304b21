//! Shared utilities for integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use provider_balancer::{Provider, ProviderId};

/// A provider whose health and latency are controlled by the test.
pub struct ScriptedProvider {
    id: ProviderId,
    healthy: AtomicBool,
    delay: Duration,
    identify_calls: AtomicUsize,
    probes: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(healthy: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            id: ProviderId::generate(),
            healthy: AtomicBool::new(healthy),
            delay,
            identify_calls: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(true, Duration::ZERO)
    }

    pub fn unhealthy() -> Arc<Self> {
        Self::new(false, Duration::ZERO)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::new(true, delay)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn identify_calls(&self) -> usize {
        self.identify_calls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    async fn identify(&self) -> ProviderId {
        self.identify_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.id.clone()
    }

    async fn check_health(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_until<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
