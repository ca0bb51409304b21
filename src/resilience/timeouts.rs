//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap provider calls with an optional deadline
//! - Report which deadline elapsed
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `None` means the call is bounded only by the provider itself

use std::future::Future;
use std::time::Duration;

/// Await `fut`, giving up after `limit` when one is set.
/// On expiry the future is dropped and the elapsed limit is returned.
pub async fn with_optional_timeout<F>(limit: Option<Duration>, fut: F) -> Result<F::Output, Duration>
where
    F: Future,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| limit),
        None => Ok(fut.await),
    }
}
