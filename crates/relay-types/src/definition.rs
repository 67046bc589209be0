//! # Service Definitions
//!
//! A service declares the set of events it can emit, and for each event the
//! expected shape of its data payload. Definitions are immutable once
//! registered with the hub; the router only ever holds them behind an `Arc`.
//!
//! The external definition format is a mapping from event key to event
//! schema, with each data field carrying a declared [`FieldType`] and an
//! `optional` flag. Definitions deserialize via serde, so any serde-capable
//! front-end (JSON over the wire, a YAML loader, ...) can produce them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Number of bytes of the definition digest kept in a [`ServiceId`].
const SERVICE_ID_BYTES: usize = 16;

/// Declared type of a single event data field.
///
/// `Object` fields are validated only structurally ("is a JSON-object-shaped
/// value"); their contents are not inspected further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// A JSON string.
    String,
    /// A JSON boolean.
    Boolean,
    /// Any JSON number (integer or float).
    Number,
    /// A JSON object.
    Object,
}

impl FieldType {
    /// Check whether a JSON value conforms to this declared type.
    #[must_use]
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Object => value.is_object(),
        }
    }

    /// The JSON type name of a value, for use in mismatch messages.
    #[must_use]
    pub fn name_of(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::String => 0,
            Self::Boolean => 1,
            Self::Number => 2,
            Self::Object => 3,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// Schema of a single data field within an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Human-readable field name.
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Declared value type, checked structurally on every emit.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field may be absent from the payload.
    #[serde(default)]
    pub optional: bool,
}

impl FieldSchema {
    /// A required field of the given type, with no display metadata.
    #[must_use]
    pub fn required(field_type: FieldType) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            field_type,
            optional: false,
        }
    }

    /// An optional field of the given type, with no display metadata.
    #[must_use]
    pub fn optional(field_type: FieldType) -> Self {
        Self {
            optional: true,
            ..Self::required(field_type)
        }
    }
}

/// Schema of one declared event: display metadata plus the expected payload
/// fields, keyed by field id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSchema {
    /// Human-readable event name.
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Expected payload fields, keyed by field id.
    #[serde(default)]
    pub data: BTreeMap<String, FieldSchema>,
}

impl EventSchema {
    /// An event schema with the given payload fields and no display metadata.
    #[must_use]
    pub fn with_fields(data: BTreeMap<String, FieldSchema>) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            data,
        }
    }
}

/// The full set of events a service declares, keyed by event key.
///
/// Event keys are unique within a definition by construction (map keys).
/// A definition is immutable for the lifetime of its registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Declared events, keyed by event key.
    pub events: BTreeMap<String, EventSchema>,
}

impl ServiceDefinition {
    /// A definition declaring the given events.
    #[must_use]
    pub fn new(events: BTreeMap<String, EventSchema>) -> Self {
        Self { events }
    }

    /// Look up the schema for an event key.
    #[must_use]
    pub fn event(&self, key: &str) -> Option<&EventSchema> {
        self.events.get(key)
    }

    /// The identity this definition derives to.
    #[must_use]
    pub fn id(&self) -> ServiceId {
        ServiceId::derive(self)
    }
}

/// Identity of a service, derived from its declared schemas.
///
/// Two definitions declaring the same event keys with the same field ids,
/// types, and optional flags derive the same id; that pairing is what links
/// an emitter to its listeners. Display metadata (names, descriptions) does
/// not participate in the derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Derive the id for a definition.
    ///
    /// The derivation walks the definition in key order (the maps are
    /// ordered), hashing event keys, field ids, field types, and optional
    /// flags, then keeps a truncated hex digest.
    #[must_use]
    pub fn derive(definition: &ServiceDefinition) -> Self {
        let mut hasher = Sha256::new();
        for (key, schema) in &definition.events {
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
            for (field_id, field) in &schema.data {
                hasher.update(field_id.as_bytes());
                hasher.update([0u8, field.field_type.tag(), u8::from(field.optional)]);
            }
            hasher.update([0xffu8]);
        }
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..SERVICE_ID_BYTES]))
    }

    /// The id as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
