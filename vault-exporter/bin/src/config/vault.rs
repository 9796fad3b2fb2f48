use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

#[serde_as]
#[derive(Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct VaultConfig {
    /// Vault server address (e.g., <https://127.0.0.1:8200>)
    #[serde(default = "VaultConfig::default_address")]
    pub address: String,

    /// Token sent as `X-Vault-Token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Namespace sent as `X-Vault-Namespace`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// PEM encoded CA certificate used to verify the Vault server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// PEM encoded client certificate for TLS authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_cert: Option<PathBuf>,

    /// PEM encoded private key of `client_cert`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<PathBuf>,

    /// Disable TLS certificate verification
    #[serde(default = "VaultConfig::default_skip_verify")]
    pub skip_verify: bool,

    /// Timeout of one health query, in seconds
    #[serde(default = "VaultConfig::default_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl VaultConfig {
    #[inline]
    pub fn default_address() -> String { vault_exporter_core::DEFAULT_VAULT_ADDRESS.to_string() }

    #[inline]
    pub const fn default_skip_verify() -> bool { false }

    #[inline]
    pub const fn default_timeout() -> Duration { vault_exporter_core::DEFAULT_VAULT_TIMEOUT }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            token: None,
            namespace: None,
            ca_cert: None,
            client_cert: None,
            client_key: None,
            skip_verify: Self::default_skip_verify(),
            timeout: Self::default_timeout(),
        }
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&vault_exporter_core::config::VaultConfig::from(self.clone()), f)
    }
}

impl From<VaultConfig> for vault_exporter_core::config::VaultConfig {
    fn from(
        VaultConfig {
            address,
            token,
            namespace,
            ca_cert,
            client_cert,
            client_key,
            skip_verify,
            timeout,
        }: VaultConfig,
    ) -> Self {
        Self { address, token, namespace, ca_cert, client_cert, client_key, skip_verify, timeout }
    }
}
