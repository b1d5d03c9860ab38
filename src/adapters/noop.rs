//! No-op Metrics Sink

use crate::domain::ports::{Exposition, MetricsSink};
use crate::domain::probe::ExecutionResult;
use crate::error::Result;

/// Discards every update. Used when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl NoopMetricsSink {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for NoopMetricsSink {
    fn update(&self, _results: &[ExecutionResult]) {}

    fn exposition(&self) -> Result<Exposition> {
        Ok(Exposition::empty())
    }
}
