//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch to a provider:
//!     → timeouts.rs (bound the provider call when a deadline is configured)
//!
//! Caller-side retry (optional):
//!     → retries.rs (retry transient dispatch errors)
//!     → backoff.rs (exponential delay with jitter between attempts)
//! ```
//!
//! # Design Decisions
//! - Timeouts bound wall-clock time; admission control only bounds concurrency
//! - Retry policy belongs to the caller, never to the balancer
//! - Jittered backoff prevents retrying callers from stampeding

pub mod backoff;
pub mod retries;
pub mod timeouts;
