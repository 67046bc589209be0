//! # Relay Types
//!
//! Domain types shared across the relaycore hub crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary
//!   (definitions, events, error taxonomy) is defined here.
//! - **Schema at the Boundary**: event payloads are loosely-typed JSON maps,
//!   but every field is checked against a declared [`FieldType`] before an
//!   event enters the hub. Mismatches are caught at the edge, not downstream.
//! - **Content-Derived Identity**: a [`ServiceId`] is derived from the declared
//!   event schemas, so emitters and listeners pair up purely by what they
//!   declared, with no out-of-band naming authority.

pub mod definition;
pub mod errors;
pub mod event;

pub use definition::{EventSchema, FieldSchema, FieldType, ServiceDefinition, ServiceId};
pub use errors::{RouteError, ValidationError};
pub use event::{EmittedEvent, EventEnvelope};
