use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fallback::FallbackConfig;

/// Configuration for the simulated verification gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Fixed artificial latency of every verification call.
    pub latency_ms: u64,
    /// Policy for well-formed values missing from the record source.
    pub fallback: FallbackConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            latency_ms: 800,
            fallback: FallbackConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}
