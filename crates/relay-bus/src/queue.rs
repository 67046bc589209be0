//! # Delivery Queue
//!
//! Bounded per-subscription buffer between the router and one listen
//! session. The capacity bound plus an explicit [`OverflowPolicy`] keeps a
//! slow consumer from growing memory without limit; which policy applies is
//! a configuration choice, never a silent default.

use parking_lot::Mutex;
use relay_types::EventEnvelope;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;

/// What to do when a subscription's queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Discard the oldest buffered event to make room for the new one.
    #[default]
    DropOldest,
    /// Discard the incoming event, keeping what is already buffered.
    DropNewest,
    /// Make the emitting call wait until the consumer frees space.
    Block,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop-oldest" => Ok(Self::DropOldest),
            "drop-newest" => Ok(Self::DropNewest),
            "block" => Ok(Self::Block),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// An overflow policy name that is not one of the known values.
#[derive(Debug, Clone, Error)]
#[error("unknown overflow policy: {0} (expected drop-oldest, drop-newest, or block)")]
pub struct UnknownPolicy(pub String);

/// Why a queue was closed, carried to the consuming session so it can end
/// its stream cleanly or with an error signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Graceful close: the subscription was cancelled or unregistered.
    Cancelled,
    /// The session's transport failed.
    Errored,
}

/// The queue was closed before the push could be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("delivery queue closed")]
pub struct QueueClosed;

/// Outcome of a successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The event was buffered.
    Queued,
    /// The event was buffered after discarding the oldest buffered event.
    ReplacedOldest,
    /// The event was discarded; the buffer was full.
    DroppedNewest,
}

struct QueueState {
    buf: VecDeque<Arc<EventEnvelope>>,
    closed: Option<CloseReason>,
}

/// Bounded event buffer for one subscription.
///
/// Single consumer (the listen session); any number of concurrent producers
/// (route dispatches). Closing is idempotent: the first close fixes the
/// reason, later closes are no-ops.
pub struct DeliveryQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    policy: OverflowPolicy,
    ready: Notify,
    space: Notify,
}

impl DeliveryQueue {
    /// A queue holding at most `capacity` events, applying `policy` when full.
    #[must_use]
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState {
                buf: VecDeque::new(),
                closed: None,
            }),
            capacity: capacity.max(1),
            policy,
            ready: Notify::new(),
            space: Notify::new(),
        }
    }

    /// Push one envelope, applying the overflow policy when full.
    ///
    /// With [`OverflowPolicy::Block`] this suspends until the consumer frees
    /// space or the queue closes.
    ///
    /// # Errors
    ///
    /// [`QueueClosed`] if the queue was closed before the push was accepted.
    pub async fn push(&self, envelope: Arc<EventEnvelope>) -> Result<PushOutcome, QueueClosed> {
        loop {
            let notified = self.space.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.closed.is_some() {
                    return Err(QueueClosed);
                }
                if state.buf.len() < self.capacity {
                    state.buf.push_back(envelope);
                    drop(state);
                    self.ready.notify_one();
                    return Ok(PushOutcome::Queued);
                }
                match self.policy {
                    OverflowPolicy::DropOldest => {
                        state.buf.pop_front();
                        state.buf.push_back(envelope);
                        drop(state);
                        self.ready.notify_one();
                        return Ok(PushOutcome::ReplacedOldest);
                    }
                    OverflowPolicy::DropNewest => return Ok(PushOutcome::DroppedNewest),
                    OverflowPolicy::Block => {}
                }
            }

            notified.await;
        }
    }

    /// Take the next buffered envelope, waiting if none is ready.
    ///
    /// Buffered events are drained even after close; once empty, a graceful
    /// close yields `Ok(None)` and an error close yields `Err(CloseReason::Errored)`.
    pub async fn pop(&self) -> Result<Option<Arc<EventEnvelope>>, CloseReason> {
        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(envelope) = state.buf.pop_front() {
                    drop(state);
                    self.space.notify_one();
                    return Ok(Some(envelope));
                }
                match state.closed {
                    Some(CloseReason::Cancelled) => return Ok(None),
                    Some(CloseReason::Errored) => return Err(CloseReason::Errored),
                    None => {}
                }
            }

            notified.await;
        }
    }

    /// Close the queue, waking the consumer and any blocked producers.
    pub fn close(&self, reason: CloseReason) {
        let mut state = self.state.lock();
        if state.closed.is_none() {
            state.closed = Some(reason);
        }
        drop(state);
        self.ready.notify_waiters();
        self.space.notify_waiters();
    }

    /// Whether the queue has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed.is_some()
    }

    /// Number of currently buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().buf.is_empty()
    }
}
