//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every registered node
//! - Feed probe results to the state machine
//! - Apply the resulting pool transitions

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::health::state::{evaluate, HealthState};
use crate::load_balancer::node::ProviderNode;
use crate::load_balancer::pool::ProviderPools;
use crate::observability::metrics;

/// Timing and threshold settings of the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthPolicy {
    /// Delay between two passes.
    pub interval: Duration,
    /// Deadline for a single probe.
    pub probe_timeout: Duration,
    /// Successful probes needed to bring a node back.
    pub consecutive_checks_required: usize,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(2),
            consecutive_checks_required: 2,
        }
    }
}

impl From<&HealthCheckConfig> for HealthPolicy {
    fn from(config: &HealthCheckConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            probe_timeout: Duration::from_secs(config.timeout_secs),
            consecutive_checks_required: config.consecutive_checks_required,
        }
    }
}

#[derive(Debug)]
pub struct HealthMonitor {
    pools: Arc<ProviderPools>,
    policy: HealthPolicy,
    /// Held for the whole of a pass, so passes never overlap.
    pass: Mutex<()>,
}

impl HealthMonitor {
    pub fn new(pools: Arc<ProviderPools>, policy: HealthPolicy) -> Self {
        Self {
            pools,
            policy,
            pass: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    /// Run a pass, then sleep for the interval, until a shutdown signal
    /// arrives or the sender is dropped. The first pass runs immediately and
    /// the delay counts from the end of each pass.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.policy.interval.as_millis() as u64,
            consecutive_checks_required = self.policy.consecutive_checks_required,
            "Health monitor starting"
        );

        loop {
            self.check_all().await;

            tokio::select! {
                _ = time::sleep(self.policy.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one pass over both pools. Waits for any pass already in progress.
    pub async fn check_all(&self) {
        let _pass = self.pass.lock().await;
        let (available, unavailable) = self.pools.snapshot();

        for node in available.iter() {
            let healthy = self.probe(node).await;
            if let Some(to) = evaluate(
                HealthState::Available,
                healthy,
                node,
                self.policy.consecutive_checks_required,
            ) {
                self.apply(node, to);
            }
        }

        for node in unavailable.iter() {
            let healthy = self.probe(node).await;
            if let Some(to) = evaluate(
                HealthState::Unavailable,
                healthy,
                node,
                self.policy.consecutive_checks_required,
            ) {
                self.apply(node, to);
            }
        }
    }

    fn apply(&self, node: &Arc<ProviderNode>, to: HealthState) {
        if !self.pools.transition(node, to) {
            tracing::debug!(provider = %node.id(), "Provider left its pool during the health pass");
            return;
        }

        metrics::record_transition(to);
        match to {
            HealthState::Unavailable => {
                tracing::warn!(provider = %node.id(), "Provider marked unavailable");
            }
            HealthState::Available => {
                tracing::info!(provider = %node.id(), "Provider recovered");
            }
        }
    }

    async fn probe(&self, node: &Arc<ProviderNode>) -> bool {
        let provider = node.provider().clone();
        let mut task = tokio::spawn(async move { provider.check_health().await });

        match time::timeout(self.policy.probe_timeout, &mut task).await {
            Ok(Ok(healthy)) => {
                if !healthy {
                    tracing::warn!(provider = %node.id(), "Health check failed");
                }
                healthy
            }
            Ok(Err(e)) => {
                tracing::warn!(provider = %node.id(), error = %e, "Health check failed: probe panicked");
                false
            }
            Err(_) => {
                task.abort();
                tracing::warn!(provider = %node.id(), "Health check failed: timeout");
                false
            }
        }
    }
}
