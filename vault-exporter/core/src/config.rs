use std::{
    fmt::{self, Debug, Formatter},
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub web: WebConfig,

    pub vault: VaultConfig,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub listen_address: SocketAddr,

    pub telemetry_path: String,
}

#[derive(Clone)]
pub struct VaultConfig {
    pub address: String,

    pub token: Option<String>,

    pub namespace: Option<String>,

    pub ca_cert: Option<PathBuf>,

    pub client_cert: Option<PathBuf>,

    pub client_key: Option<PathBuf>,

    pub skip_verify: bool,

    pub timeout: Duration,
}

impl Debug for VaultConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("namespace", &self.namespace)
            .field("ca_cert", &self.ca_cert)
            .field("client_cert", &self.client_cert)
            .field("client_key", &self.client_key)
            .field("skip_verify", &self.skip_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: crate::DEFAULT_VAULT_ADDRESS.to_string(),
            token: None,
            namespace: None,
            ca_cert: None,
            client_cert: None,
            client_key: None,
            skip_verify: false,
            timeout: crate::DEFAULT_VAULT_TIMEOUT,
        }
    }
}
