pub mod error;

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Certificate, Identity, Url};
use snafu::ResultExt;
use vault_exporter_core::{
    config::VaultConfig, model::HealthSnapshot, PROJECT_NAME, PROJECT_VERSION,
};

pub use self::error::{Error, Result};

const HEALTH_PATH: &str = "v1/sys/health";

// Report every non-active state with a 2xx status so that it decodes as a snapshot.
const HEALTH_QUERY: [(&str, &str); 5] = [
    ("standbycode", "299"),
    ("sealedcode", "299"),
    ("uninitcode", "299"),
    ("drsecondarycode", "299"),
    ("performancestandbycode", "299"),
];

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

const MAX_ERROR_BODY_LENGTH: usize = 512;

/// Source of Vault health snapshots.
#[async_trait]
pub trait HealthClient: Send + Sync {
    /// Performs exactly one health query.
    ///
    /// # Errors
    ///
    /// Returns an error if Vault is unreachable, answers with a non-success status or the
    /// response can not be decoded.
    async fn health(&self) -> Result<HealthSnapshot>;
}

/// Client for the `sys/health` endpoint of one Vault server.
#[derive(Clone)]
pub struct VaultClient {
    client: reqwest::Client,
    health_url: Url,
    token: Option<String>,
    namespace: Option<String>,
}

impl VaultClient {
    /// Create a new Vault client
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, a certificate can not be loaded or the
    /// HTTP client can not be built.
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let VaultConfig {
            address,
            token,
            namespace,
            ca_cert,
            client_cert,
            client_key,
            skip_verify,
            timeout,
        } = config;

        let health_url = health_url(address)?;

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("{PROJECT_NAME}/{PROJECT_VERSION}"))
            .timeout(*timeout)
            .danger_accept_invalid_certs(*skip_verify);

        if let Some(path) = ca_cert {
            let pem = read_file(path)?;
            let certificate =
                Certificate::from_pem(&pem).context(error::ParseCertificateSnafu { path })?;
            builder = builder.add_root_certificate(certificate);
        }

        match (client_cert, client_key) {
            (Some(cert), Some(key)) => {
                let mut pem = read_file(cert)?;
                pem.push(b'\n');
                pem.extend(read_file(key)?);
                let identity = Identity::from_pem(&pem).context(error::ParseIdentitySnafu)?;
                builder = builder.identity(identity);
            }
            (None, None) => {}
            _ => return error::IncompleteClientIdentitySnafu.fail(),
        }

        let client = builder.build().context(error::BuildClientSnafu)?;

        Ok(Self { client, health_url, token: token.clone(), namespace: namespace.clone() })
    }

    #[must_use]
    pub const fn health_url(&self) -> &Url { &self.health_url }
}

#[async_trait]
impl HealthClient for VaultClient {
    async fn health(&self) -> Result<HealthSnapshot> {
        let mut request = self.client.get(self.health_url.clone());
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }

        let response = request
            .send()
            .await
            .with_context(|_| error::SendRequestSnafu { url: self.health_url.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if let Some((index, _)) = body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
                body.truncate(index);
            }
            return error::UnexpectedStatusSnafu { status, body }.fail();
        }

        let body = response.bytes().await.context(error::ReadResponseSnafu)?;
        let snapshot: HealthSnapshot =
            serde_json::from_slice(&body).context(error::DecodeResponseSnafu)?;

        tracing::debug!(
            initialized = snapshot.initialized,
            sealed = snapshot.sealed,
            standby = snapshot.standby,
            version = %snapshot.version,
            "Received Vault health"
        );

        Ok(snapshot)
    }
}

fn health_url(address: &str) -> Result<Url> {
    let mut url = Url::parse(address).map_err(|err| Error::InvalidAddress {
        address: address.to_string(),
        message: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return error::UnsupportedSchemeSnafu { address }.fail();
    }

    // `Url::join` replaces the last segment unless the base ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    let mut url = url.join(HEALTH_PATH).map_err(|err| Error::InvalidAddress {
        address: address.to_string(),
        message: err.to_string(),
    })?;
    url.query_pairs_mut().extend_pairs(HEALTH_QUERY);

    Ok(url)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).context(error::ReadFileSnafu { path })
}
