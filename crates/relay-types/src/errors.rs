//! # Error Taxonomy
//!
//! Validation and routing errors surfaced to emitters. Both serialize, so
//! the gateway can map them into reply bodies without losing structure.
//! Subscriber-local delivery failures are deliberately *not* part of this
//! taxonomy: they are recovered inside the hub and never reach the emitter.

use crate::definition::{FieldType, ServiceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A payload failed validation against its declared event schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// The event key is not declared in the emitting service's definition.
    #[error("unknown event key: {key}")]
    UnknownEventKey {
        /// The undeclared key.
        key: String,
    },

    /// A required field is absent from the payload.
    #[error("missing required field: {field}")]
    MissingRequiredField {
        /// The absent field id.
        field: String,
    },

    /// A present field's value does not conform to its declared type.
    #[error("type mismatch for field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The offending field id.
        field: String,
        /// The declared type.
        expected: FieldType,
        /// The JSON type actually found.
        actual: String,
    },
}

/// An emitted event could not be routed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RouteError {
    /// No definition is registered for the emitting service.
    #[error("unknown service: {0}")]
    UnknownService(ServiceId),

    /// The payload failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
