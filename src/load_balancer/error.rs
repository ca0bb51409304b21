//! Load balancer error types.

use std::time::Duration;
use thiserror::Error;

use crate::provider::ProviderId;

/// Errors surfaced synchronously to callers of the load balancer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalancerError {
    /// Registration attempted with every provider slot taken.
    #[error("maximum capacity reached ({max} providers)")]
    CapacityExceeded { max: usize },

    /// The provider already has a node in one of the pools.
    #[error("provider {0} is already registered")]
    AlreadyRegistered(ProviderId),

    /// Dispatch attempted while the available pool is empty.
    #[error("no provider available")]
    NoProvidersAvailable,

    /// The selected node is already serving its maximum number of requests.
    #[error("too many requests for provider {0}")]
    TooManyRequests(ProviderId),

    /// The provider did not answer within the dispatch timeout.
    #[error("provider {provider} did not answer within {timeout:?}")]
    DispatchTimeout { provider: ProviderId, timeout: Duration },

    /// A builder limit or threshold that must be positive is zero.
    #[error("{0} must be greater than zero")]
    InvalidSetting(&'static str),

    /// Health monitor could not be spawned because no Tokio runtime is running.
    #[error("health monitor requires a running Tokio runtime")]
    RuntimeUnavailable,
}

impl BalancerError {
    /// Whether a caller may reasonably retry the operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BalancerError::NoProvidersAvailable
                | BalancerError::TooManyRequests(_)
                | BalancerError::DispatchTimeout { .. }
        )
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BalancerError::CapacityExceeded { .. } => "capacity_exceeded",
            BalancerError::AlreadyRegistered(_) => "already_registered",
            BalancerError::NoProvidersAvailable => "no_providers",
            BalancerError::TooManyRequests(_) => "too_many_requests",
            BalancerError::DispatchTimeout { .. } => "timeout",
            BalancerError::InvalidSetting(_) => "invalid_setting",
            BalancerError::RuntimeUnavailable => "runtime_unavailable",
        }
    }
}

/// Result type for load balancer operations.
pub type LoadBalancerResult<T> = Result<T, BalancerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BalancerError::CapacityExceeded { max: 10 };
        assert_eq!(err.to_string(), "maximum capacity reached (10 providers)");

        let err = BalancerError::TooManyRequests(ProviderId::new("a"));
        assert_eq!(err.to_string(), "too many requests for provider a");

        assert_eq!(
            BalancerError::NoProvidersAvailable.to_string(),
            "no provider available"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(BalancerError::NoProvidersAvailable.is_retryable());
        assert!(BalancerError::TooManyRequests(ProviderId::new("a")).is_retryable());
        assert!(BalancerError::DispatchTimeout {
            provider: ProviderId::new("a"),
            timeout: Duration::from_millis(5),
        }
        .is_retryable());
        assert!(!BalancerError::CapacityExceeded { max: 1 }.is_retryable());
        assert!(!BalancerError::AlreadyRegistered(ProviderId::new("a")).is_retryable());
        assert!(!BalancerError::InvalidSetting("max_node_load").is_retryable());
    }
}
