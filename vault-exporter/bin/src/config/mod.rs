mod error;
mod vault;
mod web;

use std::path::{Path, PathBuf};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use vault_exporter_cli_common::config::LogConfig;

pub use self::{error::Error, vault::VaultConfig, web::WebConfig};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub vault: VaultConfig,
}

impl Config {
    #[inline]
    pub fn default_path() -> PathBuf {
        [
            vault_exporter_core::PROJECT_CONFIG_DIR.to_path_buf(),
            PathBuf::from(vault_exporter_core::CONFIG_NAME),
        ]
        .into_iter()
        .collect()
    }

    /// Loads `path` when given. Otherwise loads the first configuration file found in the
    /// default locations, falling back to the built-in defaults when there is none.
    pub fn search(path: Option<&Path>) -> Result<Self, Error> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let candidates = std::iter::once(Self::default_path()).chain(
            vault_exporter_core::fallback_project_config_directories()
                .into_iter()
                .map(|dir| dir.join(vault_exporter_core::CONFIG_NAME)),
        );
        for candidate in candidates {
            if candidate.is_file() {
                return Self::load(candidate);
            }
        }

        Ok(Self::default())
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut config: Self = {
            let data = std::fs::read_to_string(&path)
                .context(error::OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

            serde_yaml::from_str(&data)
                .context(error::ParseConfigSnafu { filename: path.as_ref().to_path_buf() })?
        };

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        Ok(config)
    }
}

#[inline]
pub fn load_server_config(
    Config { web, vault, .. }: Config,
) -> Result<vault_exporter_core::config::Config, Error> {
    if !is_valid_telemetry_path(&web.telemetry_path) {
        return error::InvalidTelemetryPathSnafu { path: web.telemetry_path }.fail();
    }

    Ok(vault_exporter_core::config::Config { web: web.into(), vault: vault.into() })
}

// `*`, `:` and braces introduce wildcards and captures in axum routes.
fn is_valid_telemetry_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.chars().any(|c| c.is_whitespace() || c.is_control() || "*:{}".contains(c))
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        path::{Path, PathBuf},
        time::Duration,
    };

    use crate::config::{load_server_config, Config, Error, WebConfig};

    #[test]
    fn test_default_config_round_trip() {
        let text = serde_yaml::to_string(&Config::default()).unwrap();
        let config: Config = serde_yaml::from_str(&text).unwrap();

        assert_eq!(config.web, WebConfig::default());
        assert_eq!(config.vault, crate::config::VaultConfig::default());
        assert!(!text.contains("token"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str(
            "vault:\n  address: http://vault.internal:8200\n  token: s.token\n  timeout: 5\n",
        )
        .unwrap();

        assert_eq!(config.vault.address, "http://vault.internal:8200");
        assert_eq!(config.vault.token.as_deref(), Some("s.token"));
        assert_eq!(config.vault.timeout, Duration::from_secs(5));
        assert!(!config.vault.skip_verify);
        assert_eq!(config.web.listen_address, "0.0.0.0:9107".parse::<SocketAddr>().unwrap());
        assert_eq!(config.web.telemetry_path, "/metrics");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let path = PathBuf::from("/nonexistent/vault-exporter.yaml");
        assert!(matches!(Config::search(Some(&path)), Err(Error::OpenConfig { .. })));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("vault-exporter-{}.yaml", std::process::id()));
        std::fs::write(&path, "web:\n  telemetry_path: /vault-metrics\n").unwrap();

        let config = Config::search(Some(Path::new(&path))).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.web.telemetry_path, "/vault-metrics");
    }

    #[test]
    fn test_load_server_config_rejects_relative_telemetry_path() {
        let mut config = Config::default();
        config.web.telemetry_path = "metrics".to_string();

        assert!(matches!(
            load_server_config(config),
            Err(Error::InvalidTelemetryPath { ref path }) if path == "metrics"
        ));
    }

    #[test]
    fn test_load_server_config_rejects_route_patterns() {
        for path in ["/*a/b", "/metrics/:id", "/{metrics}", "/vault metrics"] {
            let mut config = Config::default();
            config.web.telemetry_path = path.to_string();

            assert!(
                matches!(load_server_config(config), Err(Error::InvalidTelemetryPath { .. })),
                "`{path}` should be rejected"
            );
        }

        let mut config = Config::default();
        config.web.telemetry_path = "/vault/metrics".to_string();
        assert!(load_server_config(config).is_ok());
    }

    #[test]
    fn test_load_server_config() {
        let mut config = Config::default();
        config.vault.token = Some("s.token".to_string());

        let config = load_server_config(config).unwrap();
        assert_eq!(config.web.telemetry_path, "/metrics");
        assert_eq!(config.vault.token.as_deref(), Some("s.token"));
        assert_eq!(config.vault.timeout, Duration::from_secs(60));
    }
}
