mod build_info;
mod error;
pub mod exporter;
pub mod vault_client;

use futures::{future::BoxFuture, FutureExt};
use sigfinn::{ExitStatus, LifecycleManager, Shutdown};
use snafu::ResultExt;
use vault_exporter_core::{
    config::{Config, VaultConfig, WebConfig},
    ServerInfo, PROJECT_NAME_WITH_INITIAL_CAPITAL,
};
use vault_exporter_metrics::{DefaultMetrics, LandingPage};

pub use self::{
    build_info::build_info_collector,
    error::{Error, Result},
    exporter::VaultExporter,
    vault_client::{HealthClient, VaultClient},
};

/// # Errors
/// Returns errors when server fails to start
pub async fn serve_with_shutdown(config: Config, server_info: ServerInfo) -> Result<()> {
    let Config { web, vault } = config;

    let vault_client = initialize_vault_client(&vault)?;

    let metrics = initialize_metrics(vault_client, &server_info)?;

    let landing_page = LandingPage {
        title: PROJECT_NAME_WITH_INITIAL_CAPITAL.to_string(),
        build_info: server_info.to_string(),
    };

    let lifecycle_manager = LifecycleManager::<Error>::new();

    let _handle = lifecycle_manager
        .spawn("Metrics server", create_metrics_server_future(web, landing_page, metrics));

    if let Ok(Err(err)) = lifecycle_manager.serve().await {
        tracing::error!("{err}");
        Err(err)
    } else {
        Ok(())
    }
}

/// Builds the registry exposed on the telemetry path: the build info gauge and the
/// Vault health collector backed by `client`.
///
/// # Errors
/// Returns an error if a collector can not be created or registered
pub fn initialize_metrics<C>(client: C, server_info: &ServerInfo) -> Result<DefaultMetrics>
where
    C: HealthClient + 'static,
{
    let mut metrics = DefaultMetrics::new();

    let build_info = build_info_collector(server_info).context(error::CreateCollectorSnafu)?;
    metrics.register_static(Box::new(build_info))?;

    let exporter = VaultExporter::new(client).context(error::CreateCollectorSnafu)?;
    metrics.register(exporter)?;

    tracing::info!("Registered metrics: {}", metrics.metric_names().join(", "));

    Ok(metrics)
}

#[tracing::instrument(skip(vault), fields(address = %vault.address))]
fn initialize_vault_client(vault: &VaultConfig) -> Result<VaultClient> {
    tracing::info!("Initializing Vault client");

    let client = VaultClient::new(vault).context(error::CreateVaultClientSnafu)?;

    tracing::info!("Vault health endpoint: {}", client.health_url());

    Ok(client)
}

fn create_metrics_server_future(
    WebConfig { listen_address, telemetry_path }: WebConfig,
    landing_page: LandingPage,
    metrics: DefaultMetrics,
) -> impl FnOnce(Shutdown) -> BoxFuture<'static, ExitStatus<Error>> {
    move |signal| {
        async move {
            tracing::info!("Listen metrics endpoint on {listen_address}{telemetry_path}");

            let result = vault_exporter_metrics::start_metrics_server(
                listen_address,
                &telemetry_path,
                landing_page,
                metrics,
                signal,
            )
            .await;

            match result {
                Ok(()) => {
                    tracing::info!("Metrics server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}
