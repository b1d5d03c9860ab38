//! Probe Entity and Value Objects
//!
//! A probe is a named, categorized check. Probes are cheap to clone: the
//! check function is shared behind an `Arc`, so the executor works on
//! snapshots without touching the registry.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::context::ProbeContext;
use crate::error::{CheckError, Error};

// =============================================================================
// Category
// =============================================================================

/// Probe category, a superset of the Kubernetes probe kinds.
///
/// - **Liveness**: failing means the container should be restarted.
/// - **Readiness**: failing removes the pod from service load balancers.
/// - **Startup**: gates liveness and readiness until initialization finishes.
/// - **OnDemand**: only evaluated by the `/health` endpoint, which runs every
///   registered probe regardless of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeCategory {
    #[serde(rename = "liveness")]
    Liveness,
    #[serde(rename = "readiness")]
    Readiness,
    #[serde(rename = "startup")]
    Startup,
    #[serde(rename = "health")]
    OnDemand,
}

impl ProbeCategory {
    pub const ALL: [ProbeCategory; 4] = [
        ProbeCategory::Startup,
        ProbeCategory::Liveness,
        ProbeCategory::Readiness,
        ProbeCategory::OnDemand,
    ];

    /// Label used on the wire and in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeCategory::Liveness => "liveness",
            ProbeCategory::Readiness => "readiness",
            ProbeCategory::Startup => "startup",
            ProbeCategory::OnDemand => "health",
        }
    }

    /// HTTP path answering for this category.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ProbeCategory::Liveness => "/live",
            ProbeCategory::Readiness => "/ready",
            ProbeCategory::Startup => "/startup",
            ProbeCategory::OnDemand => "/health",
        }
    }

    /// Name listed for this category in the endpoint index.
    pub fn endpoint_name(&self) -> &'static str {
        self.as_str()
    }

    /// Look up the category served at `path`.
    pub fn from_endpoint(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.endpoint() == path)
    }
}

impl fmt::Display for ProbeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liveness" | "live" => Ok(ProbeCategory::Liveness),
            "readiness" | "ready" => Ok(ProbeCategory::Readiness),
            "startup" => Ok(ProbeCategory::Startup),
            "health" | "on_demand" | "on-demand" | "custom" => Ok(ProbeCategory::OnDemand),
            other => Err(Error::invalid_probe(
                "category",
                format!("unknown category '{}'", other),
            )),
        }
    }
}

// =============================================================================
// Health
// =============================================================================

/// Probe health as of its most recent execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeHealth {
    /// Not executed yet
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl fmt::Display for ProbeHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeHealth::Unknown => write!(f, "unknown"),
            ProbeHealth::Healthy => write!(f, "healthy"),
            ProbeHealth::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

// =============================================================================
// Check Function
// =============================================================================

/// An executable probe check.
///
/// Implementations should honor the context's cancellation and deadline,
/// e.g. by wrapping their I/O in [`ProbeContext::run`].
#[async_trait]
pub trait ProbeCheck: Send + Sync {
    async fn check(&self, ctx: ProbeContext) -> Result<(), CheckError>;
}

#[async_trait]
impl<F, Fut> ProbeCheck for F
where
    F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CheckError>> + Send + 'static,
{
    async fn check(&self, ctx: ProbeContext) -> Result<(), CheckError> {
        (self)(ctx).await
    }
}

// =============================================================================
// Probe
// =============================================================================

/// A named, categorized health check.
#[derive(Clone, Serialize)]
pub struct Probe {
    name: String,
    #[serde(rename = "kind")]
    category: ProbeCategory,
    informational: bool,
    health: ProbeHealth,
    #[serde(skip)]
    check: Arc<dyn ProbeCheck>,
}

impl Probe {
    /// Create a probe. Use [`crate::builder::ProbeBuilder`] for validated construction.
    pub fn new(
        name: impl Into<String>,
        category: ProbeCategory,
        check: impl ProbeCheck + 'static,
    ) -> Self {
        Self::from_shared(name, category, Arc::new(check))
    }

    /// Create a probe from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, category: ProbeCategory, f: F) -> Self
    where
        F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CheckError>> + Send + 'static,
    {
        Self::from_shared(name, category, Arc::new(f))
    }

    pub(crate) fn from_shared(
        name: impl Into<String>,
        category: ProbeCategory,
        check: Arc<dyn ProbeCheck>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            informational: false,
            health: ProbeHealth::Unknown,
            check,
        }
    }

    /// Mark the probe as informational: failures are reported but never fail the category.
    pub fn with_informational(mut self, informational: bool) -> Self {
        self.informational = informational;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ProbeCategory {
        self.category
    }

    pub fn is_informational(&self) -> bool {
        self.informational
    }

    /// Health from the execution this snapshot came out of; `Unknown` for registry copies.
    pub fn health(&self) -> ProbeHealth {
        self.health
    }

    pub(crate) fn with_health(mut self, health: ProbeHealth) -> Self {
        self.health = health;
        self
    }

    /// Run the check once.
    pub async fn execute(&self, ctx: ProbeContext) -> Result<(), CheckError> {
        self.check.check(ctx).await
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("informational", &self.informational)
            .field("health", &self.health)
            .finish()
    }
}

// =============================================================================
// Execution Result
// =============================================================================

/// Outcome of running one probe in one execution round.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    probe: Probe,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_check_error"
    )]
    err: Option<CheckError>,
    duration_ms: u64,
    checked_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// Record the outcome of `probe`, stamping its health accordingly.
    pub fn new(probe: Probe, outcome: Result<(), CheckError>, duration: Duration) -> Self {
        let (health, err) = match outcome {
            Ok(()) => (ProbeHealth::Healthy, None),
            Err(e) => (ProbeHealth::Unhealthy, Some(e)),
        };

        Self {
            probe: probe.with_health(health),
            err,
            duration_ms: duration.as_millis() as u64,
            checked_at: Utc::now(),
        }
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub fn err(&self) -> Option<&CheckError> {
        self.err.as_ref()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    pub fn is_failure(&self) -> bool {
        self.err.is_some()
    }

    /// A failure that counts against the category outcome.
    pub fn fails_category(&self) -> bool {
        self.is_failure() && !self.probe.is_informational()
    }
}

fn serialize_check_error<S>(err: &Option<CheckError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match err {
        Some(e) => serializer.collect_str(e),
        None => serializer.serialize_none(),
    }
}

// =============================================================================
// Tests
// =============================================================================
