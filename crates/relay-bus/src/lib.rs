//! # Relay Bus - In-Memory Event Fan-Out Hub
//!
//! The core of the relaycore hub: services register typed event schemas,
//! emit events against them, and every active listener subscribed to the
//! emitting service receives its own delivery.
//!
//! ## Dispatch Flow
//!
//! ```text
//! ┌──────────────┐                        ┌──────────────┐
//! │  Service A   │                        │  Service B   │
//! │              │      emit()            │              │
//! │              │ ───────┐               │              │
//! └──────────────┘        │               └──────────────┘
//!                         ▼                       ↑
//!               ┌──────────────────┐              │
//!               │  Schema Registry │              │
//!               │  (validate)      │              │
//!               └────────┬─────────┘              │
//!                        ▼                        │
//!               ┌──────────────────┐              │
//!               │   Event Router   │ ─────────────┘
//!               │   (fan-out)      │   open_listen()
//!               └──────────────────┘
//! ```
//!
//! ## Delivery Model
//!
//! - At-most-once, fire-and-forget: an emit succeeds once validation passes
//!   and dispatch has been initiated, regardless of how many subscribers
//!   actually receive the event.
//! - Per-subscriber ordering only: one subscriber sees events in router
//!   processing order; nothing is promised across subscribers or across
//!   emitting services.
//! - One subscriber's failure never aborts delivery to the others and never
//!   fails the emitter's call.
//!
//! ## Backpressure
//!
//! Each subscription owns a bounded delivery queue with an explicit
//! [`OverflowPolicy`]; there is no unbounded buffering for slow consumers.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod hub;
pub mod queue;
pub mod registry;
pub mod router;
pub mod schema;
pub mod session;
pub mod subscriptions;

// Re-export main types
pub use hub::{EventHub, EventRelay, HubConfig};
pub use queue::OverflowPolicy;
pub use registry::ServiceRegistry;
pub use router::{EventRouter, RouteReceipt};
pub use session::{EventStream, ListenError, ListenSession};
pub use subscriptions::{SubscriptionEntry, SubscriptionId, SubscriptionState, SubscriptionTable};

/// Maximum events buffered per subscription before the overflow policy kicks in.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
