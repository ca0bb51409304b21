//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Fixed delay after each pass (active.rs)
//!     → Snapshot both pools
//!     → Probe each node (outside the pool lock)
//!     → state.rs decides the transition
//!     → pool.rs applies it under the pool lock
//! ```
//!
//! # Design Decisions
//! - Fail fast: one failed probe removes a node from dispatch
//! - Recovery is debounced by a consecutive-success threshold
//! - A probe that times out or panics counts as a failure
//! - Passes never overlap, manual or scheduled
//! - The monitor owns no pool state; it calls back into the pools

pub mod active;
pub mod state;

pub use active::{HealthMonitor, HealthPolicy};
pub use state::HealthState;
