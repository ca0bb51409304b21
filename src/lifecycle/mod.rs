//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! LoadBalancer built:
//!     shutdown.rs subscriber handed to the health monitor task
//!
//! Shutdown:
//!     signals.rs (SIGTERM/SIGINT, binary only)
//!     → LoadBalancer::shutdown
//!     → shutdown.rs broadcast → monitor loop exits → task joined
//! ```
//!
//! # Design Decisions
//! - Stopping is explicit and idempotent
//! - Dropping the balancer also stops its monitor (sender dropped)

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
