//! Translation of one Vault health query into the `vault_*` gauges.
//!
//! The catalog of metrics is fixed: [`VaultExporter::describe`] returns it without any
//! I/O, while [`VaultExporter::collect`] queries Vault once and emits either the full
//! set of samples or, when Vault could not be reached, only `vault_up 0`.

use std::collections::HashMap;

use async_trait::async_trait;
use prometheus::{
    core::{Collector as _, Desc},
    proto::MetricFamily,
    Gauge, GaugeVec, Opts,
};
use vault_exporter_core::{model::HealthSnapshot, METRICS_NAMESPACE};
use vault_exporter_metrics::Collector;

use crate::vault_client::HealthClient;

/// Name, help text and label keys of one exported metric.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MetricIdentity {
    pub name: &'static str,

    pub help: &'static str,

    pub labels: &'static [&'static str],
}

impl MetricIdentity {
    /// Name including the `vault` namespace, e.g. `vault_up`.
    #[must_use]
    pub fn fq_name(&self) -> String { format!("{METRICS_NAMESPACE}_{}", self.name) }

    fn opts(&self) -> Opts { Opts::new(self.name, self.help).namespace(METRICS_NAMESPACE) }

    fn desc(&self) -> prometheus::Result<Desc> {
        Desc::new(
            self.fq_name(),
            self.help.to_string(),
            self.labels.iter().map(ToString::to_string).collect(),
            HashMap::new(),
        )
    }
}

pub const UP: MetricIdentity =
    MetricIdentity { name: "up", help: "Was the last query of Vault successful.", labels: &[] };

pub const INITIALIZED: MetricIdentity = MetricIdentity {
    name: "initialized",
    help: "Is the Vault initialised (according to this node).",
    labels: &[],
};

pub const SEALED: MetricIdentity =
    MetricIdentity { name: "sealed", help: "Is the Vault node sealed.", labels: &[] };

pub const STANDBY: MetricIdentity =
    MetricIdentity { name: "standby", help: "Is this Vault node in standby.", labels: &[] };

pub const VERSION: MetricIdentity = MetricIdentity {
    name: "version",
    help: "Version of this Vault node.",
    labels: &["version"],
};

pub const CLUSTER_NAME: MetricIdentity = MetricIdentity {
    name: "cluster_name",
    help: "Cluster name according to this Vault node.",
    labels: &["cluster_name"],
};

pub const CLUSTER_ID: MetricIdentity = MetricIdentity {
    name: "cluster_id",
    help: "Cluster ID according to this Vault node.",
    labels: &["cluster_id"],
};

/// Every metric the exporter may emit, in emission order.
pub const CATALOG: [MetricIdentity; 7] =
    [UP, INITIALIZED, SEALED, STANDBY, VERSION, CLUSTER_NAME, CLUSTER_ID];

/// One gauge value with the label values bound to its identity's label keys.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    pub identity: MetricIdentity,

    pub value: f64,

    pub label_values: Vec<String>,
}

impl MetricSample {
    #[must_use]
    pub const fn new(identity: MetricIdentity, value: f64) -> Self {
        Self { identity, value, label_values: Vec::new() }
    }

    /// Info pattern: constant `1` with the value carried in the only label.
    #[must_use]
    pub fn info<S>(identity: MetricIdentity, label_value: S) -> Self
    where
        S: Into<String>,
    {
        Self { identity, value: 1.0, label_values: vec![label_value.into()] }
    }

    fn into_families(self) -> prometheus::Result<Vec<MetricFamily>> {
        let Self { identity, value, label_values } = self;

        if identity.labels.is_empty() {
            let gauge = Gauge::with_opts(identity.opts())?;
            gauge.set(value);
            return Ok(gauge.collect());
        }

        let gauge = GaugeVec::new(identity.opts(), identity.labels)?;
        let label_values: Vec<&str> = label_values.iter().map(String::as_str).collect();
        gauge.get_metric_with_label_values(&label_values)?.set(value);
        Ok(gauge.collect())
    }
}

const fn bool_to_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Collection adapter between a [`HealthClient`] and the metrics registry.
pub struct VaultExporter<C> {
    client: C,

    descriptors: Vec<Desc>,
}

impl<C> VaultExporter<C>
where
    C: HealthClient,
{
    /// # Errors
    ///
    /// Returns an error if a catalog entry is not a valid metric descriptor.
    pub fn new(client: C) -> prometheus::Result<Self> {
        let descriptors = CATALOG.iter().map(MetricIdentity::desc).collect::<Result<_, _>>()?;
        Ok(Self { client, descriptors })
    }

    /// Describes all the metrics ever exported by the exporter.
    #[must_use]
    pub fn describe(&self) -> Vec<Desc> { self.descriptors.clone() }

    /// Queries Vault once and maps the outcome into samples in catalog order.
    pub async fn collect(&self) -> Vec<MetricSample> {
        match self.client.health().await {
            Ok(snapshot) => health_samples(&snapshot),
            Err(err) => {
                tracing::error!("Failed to collect health from Vault server, error: {err}");
                vec![MetricSample::new(UP, 0.0)]
            }
        }
    }
}

fn health_samples(snapshot: &HealthSnapshot) -> Vec<MetricSample> {
    vec![
        MetricSample::new(UP, 1.0),
        MetricSample::new(INITIALIZED, bool_to_f64(snapshot.initialized)),
        MetricSample::new(SEALED, bool_to_f64(snapshot.sealed)),
        MetricSample::new(STANDBY, bool_to_f64(snapshot.standby)),
        MetricSample::info(VERSION, snapshot.version.as_str()),
        MetricSample::info(CLUSTER_NAME, snapshot.cluster_name.as_str()),
        MetricSample::info(CLUSTER_ID, snapshot.cluster_id.as_str()),
    ]
}

#[async_trait]
impl<C> Collector for VaultExporter<C>
where
    C: HealthClient + 'static,
{
    fn describe(&self) -> Vec<Desc> { Self::describe(self) }

    async fn collect(&self) -> Vec<MetricFamily> {
        Self::collect(self)
            .await
            .into_iter()
            .filter_map(|sample| {
                let name = sample.identity.fq_name();
                sample
                    .into_families()
                    .map_err(|err| {
                        tracing::error!("Failed to build metric `{name}`, error: {err}");
                    })
                    .ok()
            })
            .flatten()
            .collect()
    }
}
