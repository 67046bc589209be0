//! # Event Hub
//!
//! The facade tying registry, subscription table, router, and sessions
//! together, and the [`EventRelay`] trait the gateway consumes.

use crate::queue::{DeliveryQueue, OverflowPolicy};
use crate::registry::ServiceRegistry;
use crate::router::{EventRouter, RouteReceipt};
use crate::session::ListenSession;
use crate::subscriptions::SubscriptionTable;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use relay_types::{EmittedEvent, RouteError, ServiceDefinition, ServiceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Hub construction parameters.
///
/// Passed explicitly at construction; there is no process-wide hub state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Events buffered per subscription before the overflow policy applies.
    pub channel_capacity: usize,
    /// What to do when a subscription's buffer is full.
    pub overflow: OverflowPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            overflow: OverflowPolicy::default(),
        }
    }
}

/// Trait for relaying events through a hub.
///
/// This is the seam the gateway (and in-process embedders) program against.
#[async_trait]
pub trait EventRelay: Send + Sync {
    /// Emit one event on behalf of the defining service.
    ///
    /// Fire-and-forget: the call succeeds once validation passes and
    /// dispatch has been initiated; subscribers never acknowledge back.
    async fn emit(
        &self,
        definition: ServiceDefinition,
        event_key: String,
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Result<RouteReceipt, RouteError>;

    /// Open a listen session for the defining service's events.
    fn open_listen(&self, definition: ServiceDefinition) -> ListenSession;
}

/// In-memory event relay hub.
///
/// Single-process only; a distributed deployment would put a different
/// relay behind the same trait.
pub struct EventHub {
    registry: Arc<ServiceRegistry>,
    table: Arc<SubscriptionTable>,
    router: EventRouter,
    config: HubConfig,
}

impl EventHub {
    /// A hub with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// A hub with the given configuration.
    #[must_use]
    pub fn with_config(config: HubConfig) -> Self {
        let registry = Arc::new(ServiceRegistry::new());
        let table = Arc::new(SubscriptionTable::new());
        let router = EventRouter::new(Arc::clone(&registry), Arc::clone(&table));
        Self {
            registry,
            table,
            router,
            config,
        }
    }

    /// Register a service definition ahead of any emit or listen.
    ///
    /// Emit and listen both register implicitly; this exists for callers
    /// that want the derived id up front.
    pub fn register_service(&self, definition: ServiceDefinition) -> ServiceId {
        self.registry.register(definition)
    }

    /// Route an already-identified event (see [`EventRouter::route`]).
    ///
    /// # Errors
    ///
    /// [`RouteError::UnknownService`] if the id has no registered
    /// definition, or a validation failure.
    pub async fn route(&self, event: EmittedEvent) -> Result<RouteReceipt, RouteError> {
        self.router.route(event).await
    }

    /// The hub's configuration.
    #[must_use]
    pub fn config(&self) -> HubConfig {
        self.config
    }

    /// Number of currently registered subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.table.len()
    }

    /// Number of registered service definitions.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.registry.len()
    }

    /// Total events accepted for routing.
    #[must_use]
    pub fn events_routed(&self) -> u64 {
        self.router.events_routed()
    }

    /// Close every open listen session gracefully.
    ///
    /// Each session's sequence ends without an error signal; new sessions
    /// may still be opened afterwards.
    pub fn shutdown(&self) {
        let open = self.table.len();
        self.table.clear();
        info!(closed = open, "hub shut down, all listen sessions closed");
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventRelay for EventHub {
    async fn emit(
        &self,
        definition: ServiceDefinition,
        event_key: String,
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Result<RouteReceipt, RouteError> {
        let service = self.registry.register(definition);
        self.router
            .route(EmittedEvent::new(service, event_key, payload))
            .await
    }

    fn open_listen(&self, definition: ServiceDefinition) -> ListenSession {
        let service = self.registry.register(definition);
        let queue = Arc::new(DeliveryQueue::new(
            self.config.channel_capacity,
            self.config.overflow,
        ));
        let entry = self.table.register(service, queue);
        ListenSession::new(entry, Arc::clone(&self.table))
    }
}
