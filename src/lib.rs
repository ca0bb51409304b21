//! Client-side load balancer library.
//!
//! Keeps a bounded set of providers, routes each request to one available
//! provider picked by a pluggable algorithm, caps concurrent requests per
//! provider, and moves providers between the available and unavailable pools
//! from a background health monitor.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod provider;
pub mod resilience;

pub use config::BalancerConfig;
pub use load_balancer::{AlgorithmKind, BalancerError, BalancingAlgorithm, LoadBalancer};
pub use provider::{BasicProvider, Provider, ProviderId};
