//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define balancer metrics (registrations, dispatches, transitions, pool sizes)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `lb_registrations_total` (counter): registrations by outcome
//! - `lb_dispatch_total` (counter): dispatches by outcome
//! - `lb_health_transitions_total` (counter): availability changes by target state
//! - `lb_providers` (gauge): nodes per pool
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op without a recorder
//! - Labels are small closed sets

use std::net::SocketAddr;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::health::HealthState;

/// Install the Prometheus recorder and its HTTP listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_registration(outcome: &'static str) {
    ::metrics::counter!("lb_registrations_total", "outcome" => outcome).increment(1);
}

pub fn record_dispatch(outcome: &'static str) {
    ::metrics::counter!("lb_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_transition(to: HealthState) {
    ::metrics::counter!("lb_health_transitions_total", "to" => to.as_str()).increment(1);
}

pub fn record_pool_sizes(available: usize, unavailable: usize) {
    ::metrics::gauge!("lb_providers", "pool" => "available").set(available as f64);
    ::metrics::gauge!("lb_providers", "pool" => "unavailable").set(unavailable as f64);
}
