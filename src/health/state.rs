//! Provider availability state machine.
//!
//! # States
//! - Available: node is in the dispatch pool
//! - Unavailable: node is excluded from dispatch but still probed
//!
//! # State Transitions
//! ```text
//! Available → Unavailable: one failed probe
//! Unavailable → Available: consecutive_checks_required successes in a row
//! ```
//!
//! A failed probe always resets the success streak, so recovery needs
//! sustained health while degradation is immediate.

use serde::Serialize;

use crate::load_balancer::node::ProviderNode;

/// Which pool a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Available,
    Unavailable,
}

impl HealthState {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Available => "available",
            HealthState::Unavailable => "unavailable",
        }
    }
}

/// Apply one probe result to `node`, currently in `state`.
///
/// Updates the node's success streak and returns the state the node must
/// move to, or `None` when it stays where it is.
pub fn evaluate(
    state: HealthState,
    healthy: bool,
    node: &ProviderNode,
    consecutive_checks_required: usize,
) -> Option<HealthState> {
    match (state, healthy) {
        (HealthState::Available, true) => None,
        (HealthState::Available, false) => {
            node.reset_successes();
            Some(HealthState::Unavailable)
        }
        (HealthState::Unavailable, true) => {
            let streak = node.record_success();
            if streak.saturating_add(1) >= consecutive_checks_required {
                Some(HealthState::Available)
            } else {
                None
            }
        }
        (HealthState::Unavailable, false) => {
            node.reset_successes();
            None
        }
    }
}
