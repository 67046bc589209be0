//! Gateway error types.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while constructing or running the gateway.
///
/// Per-request failures never appear here: emit failures are carried in the
/// reply body and listen failures end only the affected stream.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Binding or serving the listener failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
