//! # Subscription Table
//!
//! Tracks every live subscription by id, with a per-service index for
//! fan-out lookups. Registration and removal are concurrent with routing;
//! a subscription mid-registration is either fully visible to a lookup or
//! not at all.

use crate::queue::{CloseReason, DeliveryQueue};
use dashmap::DashMap;
use parking_lot::Mutex;
use relay_types::ServiceId;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Unique id of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a subscription.
///
/// Transitions are `Open → Closed` (graceful cancel or explicit
/// unregister) or `Open → Errored → Closed` (transport failure). There is
/// no way back to `Open`; a new listen call creates a new subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Receiving events.
    Open,
    /// Removed; receives nothing further.
    Closed,
    /// Transport failed; about to be removed.
    Errored,
}

/// One live subscription: identity, the service it listens to, its delivery
/// queue, and its lifecycle state.
pub struct SubscriptionEntry {
    id: SubscriptionId,
    service: ServiceId,
    queue: Arc<DeliveryQueue>,
    state: Mutex<SubscriptionState>,
}

impl SubscriptionEntry {
    fn new(service: ServiceId, queue: Arc<DeliveryQueue>) -> Self {
        Self {
            id: SubscriptionId::new(),
            service,
            queue,
            state: Mutex::new(SubscriptionState::Open),
        }
    }

    /// This subscription's id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The service this subscription listens to.
    #[must_use]
    pub fn service(&self) -> &ServiceId {
        &self.service
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        *self.state.lock()
    }

    /// The delivery queue backing this subscription.
    #[must_use]
    pub fn queue(&self) -> &Arc<DeliveryQueue> {
        &self.queue
    }

    /// Mark the transport as failed: `Open → Errored`, error-closing the
    /// queue so the consuming session sees a terminal error.
    pub(crate) fn mark_errored(&self) {
        let mut state = self.state.lock();
        if *state == SubscriptionState::Open {
            *state = SubscriptionState::Errored;
            drop(state);
            self.queue.close(CloseReason::Errored);
        }
    }

    fn mark_closed(&self) {
        let mut state = self.state.lock();
        let was_open = *state == SubscriptionState::Open;
        *state = SubscriptionState::Closed;
        drop(state);
        if was_open {
            self.queue.close(CloseReason::Cancelled);
        }
    }
}

/// Table of live subscriptions with a per-service fan-out index.
#[derive(Default)]
pub struct SubscriptionTable {
    /// All subscriptions by id.
    entries: DashMap<SubscriptionId, Arc<SubscriptionEntry>>,
    /// Subscription ids by listened-to service.
    by_service: DashMap<ServiceId, Vec<SubscriptionId>>,
}

impl SubscriptionTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new `Open` subscription for `service` backed by `queue`.
    pub fn register(&self, service: ServiceId, queue: Arc<DeliveryQueue>) -> Arc<SubscriptionEntry> {
        let entry = Arc::new(SubscriptionEntry::new(service.clone(), queue));
        self.entries.insert(entry.id, Arc::clone(&entry));
        self.by_service.entry(service).or_default().push(entry.id);

        debug!(
            subscription = %entry.id,
            service = %entry.service,
            "subscription registered"
        );
        entry
    }

    /// Remove a subscription, transitioning it to `Closed` and closing its
    /// queue. Idempotent: removing an unknown or already-removed id is a
    /// no-op.
    ///
    /// Returns whether the id was present.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let Some((_, entry)) = self.entries.remove(&id) else {
            return false;
        };

        if let Some(mut ids) = self.by_service.get_mut(&entry.service) {
            ids.retain(|existing| *existing != id);
        }
        self.by_service
            .remove_if(&entry.service, |_, ids| ids.is_empty());
        entry.mark_closed();

        debug!(subscription = %id, service = %entry.service, "subscription removed");
        true
    }

    /// Snapshot of the `Open` subscriptions for a service.
    ///
    /// Reflects the table at call time only; registrations after the
    /// snapshot are not visible to an in-flight dispatch.
    #[must_use]
    pub fn lookup(&self, service: &ServiceId) -> Vec<Arc<SubscriptionEntry>> {
        let Some(ids) = self.by_service.get(service) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.entries.get(id).map(|entry| Arc::clone(&entry)))
            .filter(|entry| entry.state() == SubscriptionState::Open)
            .collect()
    }

    /// Whether an id is currently registered.
    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Total number of registered subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every subscription, closing each queue gracefully.
    pub fn clear(&self) {
        let ids: Vec<SubscriptionId> = self.entries.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.unregister(id);
        }
    }
}
