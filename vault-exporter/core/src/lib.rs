pub mod config;
pub mod model;

use std::{
    fmt::{self, Display, Formatter},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::LazyLock,
    time::Duration,
};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const PROJECT_NAME: &str = "vault-exporter";
pub const PROJECT_NAME_WITH_INITIAL_CAPITAL: &str = "Vault Exporter";

pub const PROGRAM_NAME: &str = "vault_exporter";
pub const CONFIG_NAME: &str = "vault-exporter.yaml";

/// Prefix of every metric derived from Vault health.
pub const METRICS_NAMESPACE: &str = "vault";

pub const DEFAULT_LISTEN_PORT: u16 = 9107;
pub const DEFAULT_LISTEN_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_LISTEN_ADDRESS: SocketAddr =
    SocketAddr::new(DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT);
pub const DEFAULT_TELEMETRY_PATH: &str = "/metrics";

pub const DEFAULT_VAULT_ADDRESS: &str = "https://127.0.0.1:8200";
pub const DEFAULT_VAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .map_or_else(|| PathBuf::from("."), |dirs| dirs.config_dir().to_path_buf())
});

#[must_use]
pub fn fallback_project_config_directories() -> Vec<PathBuf> {
    let Some(user_dirs) = directories::UserDirs::new() else {
        return vec![[Path::new("/"), Path::new("etc"), Path::new(PROJECT_NAME)].iter().collect()];
    };
    vec![
        [user_dirs.home_dir(), (Path::new(".config")), (Path::new(PROJECT_NAME))].iter().collect(),
        [user_dirs.home_dir(), (Path::new(&format!(".{PROJECT_NAME}")))].iter().collect(),
        [Path::new("/"), Path::new("etc"), Path::new(PROJECT_NAME)].iter().collect(),
    ]
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub branch: String,
    pub commit_hash: String,
    pub rust_version: String,
    pub build_time: String,
    pub start_time: DateTime<Utc>,
}

impl ServerInfo {
    /// Version information, e.g. `(version=0.1.0, branch=main, revision=1a2b3c4)`.
    #[must_use]
    pub fn info(&self) -> String {
        format!("(version={}, branch={}, revision={})", self.version, self.branch, self.commit_hash)
    }

    /// Build context, e.g. `(rust=1.87.0, date=2024-05-01 10:00:00 +00:00)`.
    #[must_use]
    pub fn build_context(&self) -> String {
        format!("(rust={}, date={})", self.rust_version, self.build_time)
    }
}

impl Display for ServerInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.info(), self.build_context())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::ServerInfo;

    #[test]
    fn test_server_info_display() {
        let info = ServerInfo {
            version: "0.1.0".to_string(),
            branch: "main".to_string(),
            commit_hash: "1a2b3c4".to_string(),
            rust_version: "1.87.0".to_string(),
            build_time: "2024-05-01".to_string(),
            start_time: Utc::now(),
        };

        assert_eq!(
            info.to_string(),
            "(version=0.1.0, branch=main, revision=1a2b3c4) (rust=1.87.0, date=2024-05-01)"
        );
    }
}
