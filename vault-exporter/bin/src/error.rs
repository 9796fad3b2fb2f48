use snafu::Snafu;

use crate::config;

/// Result type alias for the CLI.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for the CLI.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Application { source: vault_exporter_server::Error },

    #[snafu(display("Could not initialize tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: tokio::io::Error },

    #[snafu(display("{source}"))]
    Config { source: config::Error },
}

impl From<config::Error> for Error {
    fn from(source: config::Error) -> Self { Self::Config { source } }
}

impl From<vault_exporter_server::Error> for Error {
    fn from(source: vault_exporter_server::Error) -> Self { Self::Application { source } }
}

pub trait CommandError {
    fn exit_code(&self) -> exitcode::ExitCode;
}

impl CommandError for Error {
    fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            // A Vault client that can not be built means the address or TLS settings are wrong.
            Self::Application {
                source: vault_exporter_server::Error::CreateVaultClient { .. },
            }
            | Self::Config { .. } => exitcode::CONFIG,
            Self::Application { .. } => exitcode::SOFTWARE,
            Self::InitializeTokioRuntime { .. } => exitcode::IOERR,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config,
        error::{CommandError, Error},
    };

    #[test]
    fn test_exit_code() {
        let err = Error::from(config::Error::InvalidTelemetryPath { path: "metrics".to_string() });
        assert_eq!(err.exit_code(), exitcode::CONFIG);

        let err = Error::InitializeTokioRuntime {
            source: std::io::Error::new(std::io::ErrorKind::Other, "no threads"),
        };
        assert_eq!(err.exit_code(), exitcode::IOERR);
    }
}
