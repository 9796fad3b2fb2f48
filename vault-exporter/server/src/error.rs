use snafu::Snafu;

use crate::vault_client;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Metrics { source: vault_exporter_metrics::Error },

    #[snafu(display("Error occurs while creating Vault client, error: {source}"))]
    CreateVaultClient { source: vault_client::Error },

    #[snafu(display("Error occurs while creating collector, error: {source}"))]
    CreateCollector { source: prometheus::Error },
}

impl From<vault_exporter_metrics::Error> for Error {
    fn from(source: vault_exporter_metrics::Error) -> Self { Self::Metrics { source } }
}
