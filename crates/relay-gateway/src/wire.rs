//! # Wire Shapes
//!
//! Request, reply, and stream-frame bodies for the two gateway operations.
//! Event data crosses the boundary as a JSON-encoded string inside the
//! surrounding JSON body; errors travel as an `error` string that is empty
//! on success.

use relay_types::{EventEnvelope, ServiceDefinition};
use serde::{Deserialize, Serialize};

/// Body of an `EmitEvent` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitRequest {
    /// The emitting service's declared definition.
    pub service: ServiceDefinition,
    /// Declared event key.
    pub event_key: String,
    /// JSON-encoded event payload (must encode a JSON object).
    pub event_data: String,
}

/// Reply to an `EmitEvent` request. `error` is empty on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitReply {
    /// Empty on success, otherwise the failure message.
    pub error: String,
}

impl EmitReply {
    /// A successful reply.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            error: String::new(),
        }
    }

    /// A failed reply carrying `message`.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Whether this reply reports success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// First frame of a `ListenEvent` stream, sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenRequest {
    /// The listened-to service's declared definition.
    pub service: ServiceDefinition,
}

/// One server-streamed `ListenEvent` message.
///
/// Ordinary frames carry an event with an empty `error`; a frame with a
/// non-empty `error` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFrame {
    /// Empty on an event frame, otherwise the terminal failure message.
    pub error: String,
    /// Declared event key (empty on terminal frames).
    pub event_key: String,
    /// JSON-encoded event payload (empty on terminal frames).
    pub event_data: String,
}

impl StreamFrame {
    /// An event frame for a delivered envelope.
    #[must_use]
    pub fn event(envelope: &EventEnvelope) -> Self {
        Self {
            error: String::new(),
            event_key: envelope.key.clone(),
            event_data: serde_json::Value::Object(envelope.data.clone()).to_string(),
        }
    }

    /// A terminal error frame.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            event_key: String::new(),
            event_data: String::new(),
        }
    }

    /// Serialize to the on-wire JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "error": self.error,
            "eventKey": self.event_key,
            "eventData": self.event_data,
        })
        .to_string()
    }
}

/// Decode a JSON-encoded event payload into the map the hub routes.
///
/// # Errors
///
/// A human-readable message when the string is not valid JSON or does not
/// encode a JSON object.
pub fn decode_event_data(
    event_data: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, String> {
    match serde_json::from_str::<serde_json::Value>(event_data) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!(
            "event data must be a JSON object, got {}",
            relay_types::FieldType::name_of(&other)
        )),
        Err(err) => Err(format!("invalid event data: {err}")),
    }
}
