//! # Relay Gateway - External Interface for the Event Hub
//!
//! Exposes the hub's two operations over HTTP and WebSocket:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     RELAY GATEWAY                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  POST /v1/events/emit      EmitEvent (request/response)  │
//! │  GET  /v1/events/listen    ListenEvent (server stream)   │
//! │  GET  /health              liveness + hub stats          │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//!                         Event Hub
//! ```
//!
//! Emitters always get a definitive reply: validation and routing errors
//! surface as a non-empty `error` string in the reply body, never as a
//! transport fault. Listeners get a continuous stream of frames until they
//! cancel or the hub closes the session.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod server;
pub mod wire;
pub mod ws;

// Re-exports for public API
pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use server::{AppState, GatewayService};
pub use wire::{EmitReply, EmitRequest, ListenRequest, StreamFrame};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
