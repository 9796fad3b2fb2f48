use async_trait::async_trait;
use prometheus::{core::Desc, proto::MetricFamily};

/// A collector whose samples are produced at scrape time.
///
/// Unlike [`prometheus::core::Collector`], collection is asynchronous so that a
/// collector may query a remote service on every scrape.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Describes every metric this collector may ever emit.
    ///
    /// Must not perform any I/O and must return the same descriptors on every call.
    fn describe(&self) -> Vec<Desc>;

    /// Produces the metric families for one scrape.
    async fn collect(&self) -> Vec<MetricFamily>;
}

#[async_trait]
pub trait Metrics: Clone + Send + Sync {
    async fn gather(&self) -> Vec<MetricFamily>;
}
