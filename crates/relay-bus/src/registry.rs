//! # Service Registry
//!
//! Holds the declared definition for every known service. Write-once per
//! service, read on every route; re-registering an identical definition is
//! a no-op that derives the same id.

use parking_lot::RwLock;
use relay_types::{ServiceDefinition, ServiceId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry of declared service definitions.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<ServiceId, Arc<ServiceDefinition>>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, returning its derived id.
    ///
    /// Idempotent: the same definition always maps to the same id, and the
    /// first registration wins (definitions are immutable for the lifetime
    /// of the hub).
    pub fn register(&self, definition: ServiceDefinition) -> ServiceId {
        let id = definition.id();
        let mut services = self.services.write();
        if !services.contains_key(&id) {
            debug!(service = %id, events = definition.events.len(), "service registered");
            services.insert(id.clone(), Arc::new(definition));
        }
        id
    }

    /// Look up the definition for a service.
    #[must_use]
    pub fn get(&self, id: &ServiceId) -> Option<Arc<ServiceDefinition>> {
        self.services.read().get(id).cloned()
    }

    /// Whether a definition is registered for `id`.
    #[must_use]
    pub fn contains(&self, id: &ServiceId) -> bool {
        self.services.read().contains_key(id)
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}
