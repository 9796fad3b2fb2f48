use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WebConfig {
    #[serde(default = "WebConfig::default_listen_address")]
    pub listen_address: SocketAddr,

    #[serde(default = "WebConfig::default_telemetry_path")]
    pub telemetry_path: String,
}

impl WebConfig {
    #[inline]
    pub const fn default_listen_address() -> SocketAddr {
        vault_exporter_core::DEFAULT_LISTEN_ADDRESS
    }

    #[inline]
    pub fn default_telemetry_path() -> String {
        vault_exporter_core::DEFAULT_TELEMETRY_PATH.to_string()
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: Self::default_listen_address(),
            telemetry_path: Self::default_telemetry_path(),
        }
    }
}

impl From<WebConfig> for vault_exporter_core::config::WebConfig {
    fn from(WebConfig { listen_address, telemetry_path }: WebConfig) -> Self {
        Self { listen_address, telemetry_path }
    }
}
