//! Caller-side retry around dispatch.
//!
//! # Responsibilities
//! - Retry dispatch errors that are transient by nature
//! - Space attempts with exponential backoff plus jitter
//!
//! # Design Decisions
//! - The balancer never retries on its own; this helper is opt-in for callers
//! - Capacity and registration errors are never retried

use crate::config::RetryConfig;
use crate::load_balancer::{BalancerError, LoadBalancer, LoadBalancerResult};
use crate::provider::ProviderId;
use crate::resilience::backoff::calculate_backoff;

/// Whether `err` is worth another attempt under `config`.
pub fn is_retryable(err: &BalancerError, config: &RetryConfig) -> bool {
    config.enabled && err.is_retryable()
}

/// Dispatch through `balancer`, retrying transient failures.
///
/// Makes at most `max_attempts` calls (one when retries are disabled) and
/// returns the last error if none succeeds.
pub async fn get_with_retry(
    balancer: &LoadBalancer,
    config: &RetryConfig,
) -> LoadBalancerResult<ProviderId> {
    let max_attempts = if config.enabled { config.max_attempts.max(1) } else { 1 };
    let mut attempt = 0;

    loop {
        match balancer.get().await {
            Ok(id) => return Ok(id),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts || !is_retryable(&err, config) {
                    return Err(err);
                }

                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                tracing::debug!(
                    attempt,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Dispatch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
