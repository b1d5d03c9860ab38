//! In-Memory Metrics Sink
//!
//! Keeps the latest health per `(kind, probe)` pair. Useful for tests and for
//! embedders that poll probe state directly instead of scraping.

use dashmap::DashMap;

use crate::domain::ports::{Exposition, MetricsSink};
use crate::domain::probe::{ExecutionResult, ProbeCategory, ProbeHealth};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct InMemoryMetricsSink {
    states: DashMap<(ProbeCategory, String), ProbeHealth>,
}

impl InMemoryMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest recorded health, `None` if the pair was never updated.
    pub fn status(&self, kind: ProbeCategory, probe: &str) -> Option<ProbeHealth> {
        self.states
            .get(&(kind, probe.to_string()))
            .map(|entry| *entry.value())
    }

    /// Every recorded pair, sorted by kind label then probe name.
    pub fn snapshot(&self) -> Vec<(ProbeCategory, String, ProbeHealth)> {
        let mut entries: Vec<_> = self
            .states
            .iter()
            .map(|entry| {
                let (kind, name) = entry.key();
                (*kind, name.clone(), *entry.value())
            })
            .collect();
        entries.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
        entries
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&self) {
        self.states.clear();
    }
}

impl MetricsSink for InMemoryMetricsSink {
    fn update(&self, results: &[ExecutionResult]) {
        for result in results {
            let probe = result.probe();
            if probe.health() == ProbeHealth::Unknown {
                continue;
            }
            self.states
                .insert((probe.category(), probe.name().to_string()), probe.health());
        }
    }

    /// One `kind "probe" value` line per series; the name is quoted and escaped.
    fn exposition(&self) -> Result<Exposition> {
        let body: String = self
            .snapshot()
            .into_iter()
            .map(|(kind, name, health)| {
                let value = if health == ProbeHealth::Unhealthy { 1 } else { 0 };
                format!("{} {:?} {}\n", kind, name, value)
            })
            .collect();
        Ok(Exposition::new("text/plain; charset=utf-8", body))
    }
}
