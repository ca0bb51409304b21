//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pools, monitor and dispatch produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the binary installs subscribers and exporters
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
