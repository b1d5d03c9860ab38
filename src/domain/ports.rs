//! Domain Ports (Port/Adapter Pattern)
//!
//! Traits the health service depends on. The registry, execution engine and
//! metrics sink are each swappable behind one of these.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                            │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                    Ports (Traits)                    │    │
//! │  │     ProbeStore   │   Executor   │   MetricsSink      │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Adapters (Impls)                    │    │
//! │  │ InMemoryProbeStore │ ConcurrentExecutor │ Prometheus │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use bytes::Bytes;

use super::context::ProbeContext;
use super::probe::{ExecutionResult, Probe, ProbeCategory};
use crate::error::Result;

// =============================================================================
// Probe Store Port
// =============================================================================

/// Port for the probe registry.
///
/// Implementations must be safe for concurrent callers and must hand out
/// owned snapshots, so later mutation never affects an in-flight round.
pub trait ProbeStore: Send + Sync {
    /// Insert or replace probes by name (last write wins).
    fn add(&self, probes: Vec<Probe>) -> Result<()>;

    /// Point lookup; `None` when no probe has this name.
    fn get(&self, name: &str) -> Option<Probe>;

    /// Snapshot of every registered probe, in no particular order.
    fn get_all(&self) -> Vec<Probe>;

    /// Snapshot of the probes in `category`.
    ///
    /// `ProbeCategory::OnDemand` returns every registered probe.
    fn get_by_category(&self, category: ProbeCategory) -> Vec<Probe>;

    /// Remove probes by name. Unknown names are ignored.
    fn delete(&self, names: &[&str]);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Executor Port
// =============================================================================

/// Port for running one execution round.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run every probe against the shared context.
    ///
    /// Returns exactly one result per input probe; order is unspecified.
    async fn execute(&self, ctx: &ProbeContext, probes: Vec<Probe>) -> Vec<ExecutionResult>;
}

// =============================================================================
// Metrics Sink Port
// =============================================================================

/// Rendered metrics for an external scraper.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposition {
    pub content_type: String,
    pub body: Bytes,
}

impl Exposition {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Empty plain-text exposition.
    pub fn empty() -> Self {
        Self::new("text/plain; charset=utf-8", Bytes::new())
    }
}

/// Port for publishing per-probe state.
///
/// `update` sets, for every `(kind, probe)` pair, 0 for healthy and 1 for
/// unhealthy. Updates for different labels may arrive concurrently.
pub trait MetricsSink: Send + Sync {
    fn update(&self, results: &[ExecutionResult]);

    fn exposition(&self) -> Result<Exposition>;
}
