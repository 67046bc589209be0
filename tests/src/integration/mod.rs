//! Cross-crate integration flows.

pub mod backpressure;
pub mod gateway;
pub mod relay_flows;
