use std::process;

use chrono::Utc;
use snafu::ResultExt;
use tokio::runtime::Runtime;
use vault_exporter_core::{ServerInfo, PROGRAM_NAME};

use crate::{
    config::{load_server_config, Config},
    error,
    error::{Error, Result},
    shadow::{BRANCH, BUILD_TIME, PKG_VERSION, RUST_VERSION, SHORT_COMMIT},
};

/// Run the server
#[allow(clippy::cognitive_complexity, clippy::result_large_err)]
pub fn run_server(config: Config) -> Result<()> {
    config.log.registry();

    let server_info = ServerInfo {
        version: PKG_VERSION.to_string(),
        branch: BRANCH.to_string(),
        commit_hash: SHORT_COMMIT.to_string(),
        rust_version: RUST_VERSION.to_string(),
        build_time: BUILD_TIME.to_string(),
        start_time: Utc::now(),
    };

    tracing::info!("Starting {PROGRAM_NAME} {}, pid: {}", server_info.info(), process::id());
    tracing::info!("Build context {}", server_info.build_context());
    tracing::debug!("Configuration: {:?}", config.vault);

    let config = load_server_config(config)?;

    tracing::info!("Initializing Tokio runtime");

    let exit_status = match Runtime::new().context(error::InitializeTokioRuntimeSnafu) {
        Ok(runtime) => runtime.block_on(async move {
            vault_exporter_server::serve_with_shutdown(config, server_info)
                .await
                .map_err(Error::from)
        }),

        Err(err) => Err(err),
    };

    if let Err(ref error) = exit_status {
        tracing::error!(%error);
    }

    tracing::info!("{PROGRAM_NAME} is shutdown");
    exit_status
}
