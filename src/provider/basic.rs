//! Reference provider with a random identity.

use async_trait::async_trait;
use std::hash::{Hash, Hasher};

use super::{Provider, ProviderId};

/// A provider that answers with its own UUID and is always healthy.
#[derive(Debug, Clone)]
pub struct BasicProvider {
    id: ProviderId,
}

impl BasicProvider {
    pub fn new() -> Self {
        Self {
            id: ProviderId::generate(),
        }
    }

    /// Create a provider with a fixed id.
    pub fn with_id(id: impl Into<ProviderId>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for BasicProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BasicProvider {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BasicProvider {}

impl Hash for BasicProvider {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[async_trait]
impl Provider for BasicProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }
}
