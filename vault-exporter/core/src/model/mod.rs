use serde::{Deserialize, Serialize};

/// Health of a Vault node as reported by `sys/health`.
///
/// A sealed node omits the cluster fields; they decode as empty strings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub initialized: bool,

    pub sealed: bool,

    pub standby: bool,

    #[serde(default)]
    pub performance_standby: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_performance_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_dr_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_time_utc: Option<i64>,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub cluster_name: String,

    #[serde(default)]
    pub cluster_id: String,
}
