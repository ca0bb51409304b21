//! Provider collaborator interface.
//!
//! # Data Flow
//! ```text
//! Caller constructs a Provider
//!     → LoadBalancer::register (wrapped in a ProviderNode)
//!     → identify() serves dispatched requests
//!     → check_health() answers monitor probes
//! ```
//!
//! # Design Decisions
//! - Identity is a token owned by the provider, not derived from its state
//! - Two providers are equal iff their ids are equal
//! - Providers are shared with the caller via `Arc`; the balancer never builds them

pub mod basic;

pub use basic::BasicProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity token of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create an id from an existing token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A backend unit of work that can serve a request and answer a health probe.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Identity token. Must return the same value on every call.
    fn id(&self) -> &ProviderId;

    /// Serve one request. The result is the provider's identifier.
    async fn identify(&self) -> ProviderId {
        self.id().clone()
    }

    /// Answer a health probe.
    async fn check_health(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ProviderId::generate(), ProviderId::generate());
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = ProviderId::from("node-a");
        assert_eq!(id.to_string(), "node-a");
        assert_eq!(id.as_str(), "node-a");
        assert_eq!(ProviderId::from("node-a".to_string()), id);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = ProviderId::new("node-a");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"node-a\"");
    }
}
