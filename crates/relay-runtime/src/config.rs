//! # Node Configuration
//!
//! Unified configuration for the hub and gateway, with environment
//! overrides. All values have sane defaults; the endpoint address is the
//! one setting deployments typically override.

use relay_bus::{HubConfig, OverflowPolicy};
use relay_gateway::GatewayConfig;
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Hub (routing and backpressure) configuration.
    pub hub: HubConfig,
    /// Gateway (endpoint) configuration.
    pub gateway: GatewayConfig,
}

impl NodeConfig {
    /// Load defaults, then apply `RELAY_*` environment overrides.
    ///
    /// Recognized variables: `RELAY_HOST`, `RELAY_PORT`,
    /// `RELAY_CHANNEL_CAPACITY`, `RELAY_OVERFLOW_POLICY`
    /// (`drop-oldest` | `drop-newest` | `block`), `RELAY_MAX_MESSAGE_SIZE`.
    /// Unparsable values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("RELAY_HOST") {
            match host.parse() {
                Ok(host) => config.gateway.host = host,
                Err(_) => warn!(value = %host, "RELAY_HOST is not a valid IP address"),
            }
        }
        if let Ok(port) = std::env::var("RELAY_PORT") {
            match port.parse() {
                Ok(port) => config.gateway.port = port,
                Err(_) => warn!(value = %port, "RELAY_PORT is not a valid port"),
            }
        }
        if let Ok(capacity) = std::env::var("RELAY_CHANNEL_CAPACITY") {
            match capacity.parse() {
                Ok(capacity) => config.hub.channel_capacity = capacity,
                Err(_) => warn!(value = %capacity, "RELAY_CHANNEL_CAPACITY is not a number"),
            }
        }
        if let Ok(policy) = std::env::var("RELAY_OVERFLOW_POLICY") {
            match policy.parse::<OverflowPolicy>() {
                Ok(policy) => config.hub.overflow = policy,
                Err(err) => warn!(error = %err, "RELAY_OVERFLOW_POLICY ignored"),
            }
        }
        if let Ok(size) = std::env::var("RELAY_MAX_MESSAGE_SIZE") {
            match size.parse() {
                Ok(size) => config.gateway.max_message_size = size,
                Err(_) => warn!(value = %size, "RELAY_MAX_MESSAGE_SIZE is not a number"),
            }
        }

        config
    }
}
