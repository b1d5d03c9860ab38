//! Health Service
//!
//! Ties the registry, executor and metrics sink together: select probes,
//! run them, publish every result, and derive the category outcome.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::policy::{CategoryReport, Outcome};
use crate::adapters::NoopMetricsSink;
use crate::domain::context::ProbeContext;
use crate::domain::ports::{Executor, MetricsSink, ProbeStore};
use crate::domain::probe::{ExecutionResult, Probe, ProbeCategory};
use crate::executor::ConcurrentExecutor;
use crate::registry::InMemoryProbeStore;

/// Entry point for evaluating probes.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct HealthService {
    store: Arc<dyn ProbeStore>,
    executor: Arc<dyn Executor>,
    metrics: Arc<dyn MetricsSink>,
}

impl HealthService {
    pub fn new(
        store: Arc<dyn ProbeStore>,
        executor: Arc<dyn Executor>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            store,
            executor,
            metrics,
        }
    }

    /// In-memory store, concurrent executor and the given sink.
    pub fn with_metrics(metrics: Arc<dyn MetricsSink>) -> Self {
        Self::new(
            Arc::new(InMemoryProbeStore::new()),
            Arc::new(ConcurrentExecutor::new()),
            metrics,
        )
    }

    /// In-memory store, concurrent executor and no metrics.
    pub fn in_memory() -> Self {
        Self::with_metrics(Arc::new(NoopMetricsSink::new()))
    }

    pub fn store(&self) -> &Arc<dyn ProbeStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    /// Run `probes` and forward every result to the metrics sink.
    pub async fn execute_probes(
        &self,
        ctx: &ProbeContext,
        probes: Vec<Probe>,
    ) -> Vec<ExecutionResult> {
        let results = self.executor.execute(ctx, probes).await;
        self.metrics.update(&results);
        results
    }

    /// Run every registered probe regardless of category.
    pub async fn execute_all(&self, ctx: &ProbeContext) -> Vec<ExecutionResult> {
        let probes = self.store.get_all();
        self.execute_probes(ctx, probes).await
    }

    /// Run the probes of `category` and aggregate them.
    ///
    /// `OnDemand` runs every registered probe.
    #[instrument(skip(self, ctx), fields(kind = %category))]
    pub async fn execute_category(
        &self,
        ctx: &ProbeContext,
        category: ProbeCategory,
    ) -> CategoryReport {
        let probes = self.store.get_by_category(category);
        debug!(count = probes.len(), "Executing probes");

        let results = self.execute_probes(ctx, probes).await;
        let report = CategoryReport::new(category, results);

        if !report.is_healthy() {
            info!(
                failed = report.failures().filter(|r| r.fails_category()).count(),
                "Category unhealthy"
            );
        }

        report
    }

    /// Aggregate verdict for `category`.
    pub async fn evaluate(&self, ctx: &ProbeContext, category: ProbeCategory) -> Outcome {
        self.execute_category(ctx, category).await.outcome
    }
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("probes", &self.store.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
