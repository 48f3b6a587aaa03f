//! Gateway client configuration

use crate::client::ReconnectPolicy;
use std::env;

/// Default gateway endpoint
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.toplist.gg";

/// Environment variable overriding the gateway endpoint
pub const GATEWAY_URL_ENV: &str = "TOPLIST_GATEWAY_URL";

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway endpoint to connect to
    pub url: String,

    /// Policy applied when the transport drops after a session was ready
    pub reconnect: ReconnectPolicy,
}

impl GatewayConfig {
    /// Build a configuration from the environment
    ///
    /// Honors `TOPLIST_GATEWAY_URL`; everything else keeps its default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var(GATEWAY_URL_ENV) {
            config.url = url;
        }
        config
    }

    /// Set the gateway endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the reconnect policy
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}
