//! Prometheus Metrics Sink
//!
//! Publishes one gauge series per `(kind, probe)` pair on a private registry.

use dashmap::DashSet;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::trace;

use crate::domain::ports::{Exposition, MetricsSink};
use crate::domain::probe::{ExecutionResult, ProbeCategory, ProbeHealth};
use crate::error::Result;

const SUBSYSTEM: &str = "healthcheck";
const METRIC_NAME: &str = "status";
const METRIC_HELP: &str = "Current probe check status (0=healthy, 1=unhealthy)";
const LABELS: [&str; 2] = ["kind", "probe"];

/// Metrics sink backed by a `prometheus` gauge vector.
///
/// The series is named `<namespace>_healthcheck_status`; an empty namespace
/// drops the prefix.
pub struct PrometheusMetricsSink {
    registry: Registry,
    status: GaugeVec,
    namespace: String,
    published: DashSet<(ProbeCategory, String)>,
}

impl PrometheusMetricsSink {
    /// Create a sink with its own registry.
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        Self::with_registry(namespace, Registry::new())
    }

    /// Create a sink that registers its gauge on `registry`.
    ///
    /// Lets the embedding process expose probe state next to its own metrics.
    pub fn with_registry(namespace: impl Into<String>, registry: Registry) -> Result<Self> {
        let namespace = namespace.into();
        let opts = Opts::new(METRIC_NAME, METRIC_HELP)
            .namespace(namespace.clone())
            .subsystem(SUBSYSTEM);
        let status = GaugeVec::new(opts, &LABELS)?;
        registry.register(Box::new(status.clone()))?;

        Ok(Self {
            registry,
            status,
            namespace,
            published: DashSet::new(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Last published value for a series, `None` if it was never set.
    pub fn status(&self, kind: ProbeCategory, probe: &str) -> Option<f64> {
        if !self.published.contains(&(kind, probe.to_string())) {
            return None;
        }
        Some(self.status.with_label_values(&[kind.as_str(), probe]).get())
    }
}

impl std::fmt::Debug for PrometheusMetricsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetricsSink")
            .field("namespace", &self.namespace)
            .field("series", &self.published.len())
            .finish()
    }
}

impl MetricsSink for PrometheusMetricsSink {
    fn update(&self, results: &[ExecutionResult]) {
        for result in results {
            let probe = result.probe();
            let value = match probe.health() {
                ProbeHealth::Healthy => 0.0,
                ProbeHealth::Unhealthy => 1.0,
                ProbeHealth::Unknown => continue,
            };

            self.status
                .with_label_values(&[probe.category().as_str(), probe.name()])
                .set(value);
            self.published
                .insert((probe.category(), probe.name().to_string()));

            trace!(kind = %probe.category(), probe = %probe.name(), value, "Gauge updated");
        }
    }

    fn exposition(&self) -> Result<Exposition> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(Exposition::new(encoder.format_type(), buffer))
    }
}
