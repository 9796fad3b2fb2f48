pub mod error;
mod server;
mod traits;

use std::{
    collections::BTreeSet,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use async_trait::async_trait;
use prometheus::proto::MetricFamily;
use snafu::ResultExt;

pub use self::{
    error::Error,
    server::{metrics_router, start_metrics_server, LandingPage},
    traits::{Collector, Metrics},
};

/// Registry of everything exposed on the metrics endpoint.
///
/// Static collectors are kept in a [`prometheus::Registry`]; scrape-time collectors are
/// asked for their samples on every [`Metrics::gather`]. Metric names are unique across
/// both kinds.
#[derive(Clone, Default)]
pub struct DefaultMetrics {
    registry: prometheus::Registry,

    collectors: Vec<Arc<dyn Collector>>,

    names: BTreeSet<String>,
}

impl Debug for DefaultMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMetrics").field("names", &self.names).finish_non_exhaustive()
    }
}

impl DefaultMetrics {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers a collector whose values do not depend on a scrape.
    ///
    /// # Errors
    ///
    /// Returns an error if one of its metric names is already registered.
    pub fn register_static(
        &mut self,
        collector: Box<dyn prometheus::core::Collector>,
    ) -> Result<(), Error> {
        let names = collector.desc().into_iter().map(|desc| desc.fq_name.clone()).collect();
        self.reserve(names)?;
        self.registry.register(collector).context(error::RegisterCollectorSnafu)
    }

    /// Registers a collector which is invoked on every scrape.
    ///
    /// # Errors
    ///
    /// Returns an error if one of its metric names is already registered.
    pub fn register<C>(&mut self, collector: C) -> Result<(), Error>
    where
        C: Collector + 'static,
    {
        let names = collector.describe().into_iter().map(|desc| desc.fq_name).collect();
        self.reserve(names)?;
        self.collectors.push(Arc::new(collector));
        Ok(())
    }

    /// Fully-qualified names of every registered metric, sorted.
    #[must_use]
    pub fn metric_names(&self) -> Vec<&str> { self.names.iter().map(String::as_str).collect() }

    fn reserve(&mut self, names: Vec<String>) -> Result<(), Error> {
        let mut pending = BTreeSet::new();
        for name in names {
            if self.names.contains(&name) || !pending.insert(name.clone()) {
                return Err(Error::AlreadyRegistered { name });
            }
        }
        self.names.append(&mut pending);
        Ok(())
    }
}

#[async_trait]
impl Metrics for DefaultMetrics {
    async fn gather(&self) -> Vec<MetricFamily> {
        let mut families = self.registry.gather();

        let collected =
            futures::future::join_all(self.collectors.iter().map(|collector| collector.collect()))
                .await;
        families.extend(
            collected.into_iter().flatten().filter(|family| !family.get_metric().is_empty()),
        );

        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        families
    }
}
