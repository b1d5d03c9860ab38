//! Aggregation and Status Policy
//!
//! [`HealthService`] selects probes from the registry, runs them through the
//! executor, publishes the results and derives one [`Outcome`] per category.

mod health;
pub mod policy;

pub use health::HealthService;
pub use policy::{aggregate, CategoryReport, Outcome};
