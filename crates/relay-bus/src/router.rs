//! # Event Router
//!
//! Validates an emitted event against its declared schema and fans it out
//! to every open subscription for the emitting service. Delivery failures
//! are subscriber-local: a dead subscription is torn down and the dispatch
//! carries on, and the emitter's call is never failed by them.

use crate::queue::{PushOutcome, QueueClosed};
use crate::registry::ServiceRegistry;
use crate::schema;
use crate::subscriptions::SubscriptionTable;
use relay_types::{EmittedEvent, EventEnvelope, RouteError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a dispatch accomplished.
///
/// An emit succeeds once validation passes and dispatch has been initiated;
/// the receipt reports how many subscribers were handed the event and how
/// many buffered events the overflow policy discarded along the way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteReceipt {
    /// Subscriptions the event was queued for.
    pub delivered: usize,
    /// Events discarded by per-subscription overflow policies.
    pub dropped: usize,
}

/// Routes emitted events through validation to fan-out.
pub struct EventRouter {
    registry: Arc<ServiceRegistry>,
    table: Arc<SubscriptionTable>,
    events_routed: AtomicU64,
}

impl EventRouter {
    /// A router over the given registry and subscription table.
    #[must_use]
    pub fn new(registry: Arc<ServiceRegistry>, table: Arc<SubscriptionTable>) -> Self {
        Self {
            registry,
            table,
            events_routed: AtomicU64::new(0),
        }
    }

    /// Route one emitted event.
    ///
    /// Looks up the emitting service's definition, validates the payload,
    /// then delivers to a snapshot of the open subscriptions for that
    /// service. A subscription whose queue has closed is unregistered and
    /// skipped; this never fails the call.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownService`] if no definition is registered.
    /// - [`RouteError::Validation`] if the payload fails its schema.
    pub async fn route(&self, event: EmittedEvent) -> Result<RouteReceipt, RouteError> {
        let definition = self
            .registry
            .get(&event.service)
            .ok_or_else(|| RouteError::UnknownService(event.service.clone()))?;
        schema::validate(&definition, &event.key, &event.data)?;

        self.events_routed.fetch_add(1, Ordering::Relaxed);

        let service = event.service;
        let envelope = Arc::new(EventEnvelope::new(event.key, event.data));
        let subscriptions = self.table.lookup(&service);

        let mut receipt = RouteReceipt::default();
        for entry in subscriptions {
            match entry.queue().push(Arc::clone(&envelope)).await {
                Ok(PushOutcome::Queued) => receipt.delivered += 1,
                Ok(PushOutcome::ReplacedOldest) => {
                    receipt.delivered += 1;
                    receipt.dropped += 1;
                    debug!(
                        subscription = %entry.id(),
                        "slow consumer, oldest buffered event dropped"
                    );
                }
                Ok(PushOutcome::DroppedNewest) => {
                    receipt.dropped += 1;
                    debug!(
                        subscription = %entry.id(),
                        key = %envelope.key,
                        "slow consumer, event dropped"
                    );
                }
                Err(QueueClosed) => {
                    warn!(
                        subscription = %entry.id(),
                        service = %service,
                        "delivery failed, removing subscription"
                    );
                    self.table.unregister(entry.id());
                }
            }
        }

        debug!(
            service = %service,
            key = %envelope.key,
            delivered = receipt.delivered,
            dropped = receipt.dropped,
            "event routed"
        );
        Ok(receipt)
    }

    /// Total events accepted for routing.
    #[must_use]
    pub fn events_routed(&self) -> u64 {
        self.events_routed.load(Ordering::Relaxed)
    }
}
