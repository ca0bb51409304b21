//! The load balancer orchestrator.
//!
//! # Responsibilities
//! - Register and unregister providers within the capacity ceiling
//! - Dispatch each request to one available provider
//! - Own the balancing algorithm and the health monitor task

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::BalancerConfig;
use crate::health::{HealthMonitor, HealthPolicy, HealthState};
use crate::lifecycle::Shutdown;
use crate::load_balancer::error::{BalancerError, LoadBalancerResult};
use crate::load_balancer::node::ProviderNode;
use crate::load_balancer::pool::ProviderPools;
use crate::load_balancer::{AlgorithmKind, BalancingAlgorithm};
use crate::observability::metrics;
use crate::provider::{Provider, ProviderId};

/// Shortest accepted delay between two health passes.
const MIN_HEALTH_CHECK_DELAY: Duration = Duration::from_millis(1);

/// Client-side load balancer over a bounded set of providers.
#[derive(Debug)]
pub struct LoadBalancer {
    pools: Arc<ProviderPools>,
    algorithm: Box<dyn BalancingAlgorithm>,
    max_node_load: usize,
    dispatch_timeout: Option<Duration>,
    health: Arc<HealthMonitor>,
    shutdown: Shutdown,
    monitor_task: Mutex<Option<JoinHandle<()>>>,
}

impl LoadBalancer {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Build a balancer from a validated configuration.
    pub fn from_config(config: &BalancerConfig) -> LoadBalancerResult<Self> {
        Self::builder()
            .with_max_providers(config.balancer.max_providers)
            .with_max_node_load(config.balancer.max_node_load)
            .with_algorithm(config.balancer.algorithm)
            .with_dispatch_timeout(config.balancer.dispatch_timeout())
            .with_health_checks(config.health_check.enabled)
            .with_health_policy(HealthPolicy::from(&config.health_check))
            .build()
    }

    /// Add a provider to the available pool.
    pub fn register(&self, provider: Arc<dyn Provider>) -> LoadBalancerResult<()> {
        let id = provider.id().clone();
        let node = Arc::new(ProviderNode::new(provider, self.max_node_load));

        match self.pools.insert(node) {
            Ok(()) => {
                metrics::record_registration("ok");
                tracing::info!(provider = %id, "Provider registered");
                Ok(())
            }
            Err(e) => {
                metrics::record_registration(e.kind());
                tracing::warn!(provider = %id, error = %e, "Provider registration rejected");
                Err(e)
            }
        }
    }

    /// Remove a provider from whichever pool holds it.
    /// Unknown providers are ignored; returns whether a node was removed.
    pub fn unregister(&self, provider: &dyn Provider) -> bool {
        let removed = self.pools.remove(provider.id()).is_some();
        if removed {
            tracing::info!(provider = %provider.id(), "Provider unregistered");
        }
        removed
    }

    /// Dispatch one request to an available provider.
    ///
    /// Reads the available pool once without locking, so a provider that a
    /// concurrent health pass is removing may still get this request.
    pub async fn get(&self) -> LoadBalancerResult<ProviderId> {
        let available = self.pools.available();
        if available.is_empty() {
            metrics::record_dispatch(BalancerError::NoProvidersAvailable.kind());
            tracing::debug!("Dispatch rejected: no provider available");
            return Err(BalancerError::NoProvidersAvailable);
        }

        // Custom algorithms are not trusted to stay in range.
        let index = self.algorithm.pick(available.len()) % available.len();
        let node = &available[index];

        let result = node.try_dispatch(self.dispatch_timeout).await;
        match &result {
            Ok(_) => metrics::record_dispatch("ok"),
            Err(e) => {
                metrics::record_dispatch(e.kind());
                tracing::debug!(provider = %node.id(), error = %e, "Dispatch rejected");
            }
        }
        result
    }

    pub fn count_available_providers(&self) -> usize {
        self.pools.count_available()
    }

    pub fn count_unavailable_providers(&self) -> usize {
        self.pools.count_unavailable()
    }

    pub fn count_total_providers(&self) -> usize {
        self.pools.count_total()
    }

    /// Run one health pass now, on the calling task.
    ///
    /// Waits for a background pass in progress, if any. A manual pass counts
    /// toward recovery exactly like a scheduled one.
    pub async fn check_health_now(&self) {
        self.health.check_all().await;
    }

    /// Stop the health monitor and wait for it to exit. Safe to call twice.
    pub async fn shutdown(&self) {
        if self.shutdown.trigger() {
            tracing::info!("Load balancer shutting down");
        }

        let handle = self
            .monitor_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Health monitor task failed");
            }
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn health_policy(&self) -> &HealthPolicy {
        self.health.policy()
    }

    /// Point-in-time view of every registered provider.
    pub fn status(&self) -> BalancerStatus {
        let (available, unavailable) = self.pools.snapshot();
        let describe = |state: HealthState| {
            move |node: &Arc<ProviderNode>| ProviderStatus {
                id: node.id().clone(),
                state,
                in_flight: node.in_flight(),
                max_load: node.max_load(),
            }
        };

        BalancerStatus {
            algorithm: self.algorithm.name(),
            max_providers: self.pools.max_providers(),
            max_node_load: self.max_node_load,
            providers: available
                .iter()
                .map(describe(HealthState::Available))
                .chain(unavailable.iter().map(describe(HealthState::Unavailable)))
                .collect(),
        }
    }
}

impl Drop for LoadBalancer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Status of one registered provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub state: HealthState,
    pub in_flight: usize,
    pub max_load: usize,
}

/// Status of the whole balancer.
#[derive(Debug, Clone, Serialize)]
pub struct BalancerStatus {
    pub algorithm: &'static str,
    pub max_providers: usize,
    pub max_node_load: usize,
    pub providers: Vec<ProviderStatus>,
}

/// Builder for [`LoadBalancer`]. Defaults: 10 providers, 10 requests per
/// provider, round-robin, health pass every 5s, recovery after 2 successes.
#[derive(Debug)]
pub struct Builder {
    algorithm: Box<dyn BalancingAlgorithm>,
    max_providers: usize,
    max_node_load: usize,
    dispatch_timeout: Option<Duration>,
    health: HealthPolicy,
    health_checks: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::default().build(),
            max_providers: 10,
            max_node_load: 10,
            dispatch_timeout: None,
            health: HealthPolicy::default(),
            health_checks: true,
        }
    }
}

impl Builder {
    pub fn with_algorithm(mut self, kind: AlgorithmKind) -> Self {
        self.algorithm = kind.build();
        self
    }

    pub fn with_custom_algorithm(mut self, algorithm: impl BalancingAlgorithm + 'static) -> Self {
        self.algorithm = Box::new(algorithm);
        self
    }

    pub fn with_max_providers(mut self, max_providers: usize) -> Self {
        self.max_providers = max_providers;
        self
    }

    pub fn with_max_node_load(mut self, max_node_load: usize) -> Self {
        self.max_node_load = max_node_load;
        self
    }

    pub fn with_consecutive_checks_required(mut self, required: usize) -> Self {
        self.health.consecutive_checks_required = required;
        self
    }

    pub fn with_health_check_delay(mut self, delay: Duration) -> Self {
        self.health.interval = delay;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.health.probe_timeout = timeout;
        self
    }

    pub fn with_health_policy(mut self, policy: HealthPolicy) -> Self {
        self.health = policy;
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Enable or disable the background monitor. When disabled, health is
    /// only checked through [`LoadBalancer::check_health_now`].
    pub fn with_health_checks(mut self, enabled: bool) -> Self {
        self.health_checks = enabled;
        self
    }

    /// Build the balancer and start its health monitor.
    ///
    /// Fails with `InvalidSetting` when a limit or the recovery threshold is
    /// zero, and with `RuntimeUnavailable` when health checks are enabled and
    /// no Tokio runtime is running.
    pub fn build(self) -> LoadBalancerResult<LoadBalancer> {
        for (name, value) in [
            ("max_providers", self.max_providers),
            ("max_node_load", self.max_node_load),
            (
                "consecutive_checks_required",
                self.health.consecutive_checks_required,
            ),
        ] {
            if value == 0 {
                return Err(BalancerError::InvalidSetting(name));
            }
        }

        let mut policy = self.health;
        policy.interval = policy.interval.max(MIN_HEALTH_CHECK_DELAY);

        let pools = Arc::new(ProviderPools::new(self.max_providers));
        let health = Arc::new(HealthMonitor::new(pools.clone(), policy));
        let shutdown = Shutdown::new();

        let monitor_task = if self.health_checks {
            let runtime = Handle::try_current().map_err(|_| BalancerError::RuntimeUnavailable)?;
            Some(runtime.spawn(health.clone().run(shutdown.subscribe())))
        } else {
            None
        };

        tracing::info!(
            algorithm = self.algorithm.name(),
            max_providers = self.max_providers,
            max_node_load = self.max_node_load,
            health_checks = self.health_checks,
            "Load balancer ready"
        );

        Ok(LoadBalancer {
            pools,
            algorithm: self.algorithm,
            max_node_load: self.max_node_load,
            dispatch_timeout: self.dispatch_timeout,
            health,
            shutdown,
            monitor_task: Mutex::new(monitor_task),
        })
    }
}
