//! Status Policy
//!
//! Turns one round's results into the single verdict reported for a category.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::probe::{ExecutionResult, ProbeCategory};

/// Aggregate verdict for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Healthy,
    Unhealthy,
}

impl Outcome {
    pub fn is_healthy(&self) -> bool {
        *self == Outcome::Healthy
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Healthy => write!(f, "healthy"),
            Outcome::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Unhealthy iff at least one non-informational probe failed.
///
/// Each result is judged on its own; an informational failure never masks or
/// amplifies another probe's outcome. An empty round is vacuously healthy.
pub fn aggregate(results: &[ExecutionResult]) -> Outcome {
    if results.iter().any(ExecutionResult::fails_category) {
        Outcome::Unhealthy
    } else {
        Outcome::Healthy
    }
}

/// Result of evaluating one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: ProbeCategory,
    pub outcome: Outcome,
    pub results: Vec<ExecutionResult>,
}

impl CategoryReport {
    pub fn new(category: ProbeCategory, results: Vec<ExecutionResult>) -> Self {
        Self {
            category,
            outcome: aggregate(&results),
            results,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.outcome.is_healthy()
    }

    /// Results of probes whose check failed, informational ones included.
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| r.is_failure())
    }
}
