//! # Events
//!
//! [`EmittedEvent`] is the transient submission a service hands to the
//! router; [`EventEnvelope`] is the immutable, validated payload the hub
//! fans out. Every subscriber shares the same envelope by reference
//! (`Arc<EventEnvelope>`), so fan-out never copies payloads.

use crate::definition::ServiceId;
use serde::{Deserialize, Serialize};

/// A single event submitted for routing.
///
/// Created on each emit call and discarded after routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Identity of the emitting service.
    pub service: ServiceId,
    /// Declared event key.
    pub key: String,
    /// Raw data payload, validated against the declared schema on routing.
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl EmittedEvent {
    /// An event from `service` under `key` carrying `data`.
    #[must_use]
    pub fn new(
        service: ServiceId,
        key: impl Into<String>,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            service,
            key: key.into(),
            data,
        }
    }
}

/// A validated event as delivered to subscribers.
///
/// The payload is immutable once the envelope is built; delivery shares one
/// envelope across all subscribers of a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Declared event key.
    pub key: String,
    /// Validated data payload.
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl EventEnvelope {
    /// An envelope for `key` carrying `data`.
    #[must_use]
    pub fn new(key: impl Into<String>, data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}
