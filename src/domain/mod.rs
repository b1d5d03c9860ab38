//! Domain Layer
//!
//! Probe entities, the execution context and the ports the service depends on.
//!
//! - **Probe** (`probe.rs`) - probe entity, categories and execution results
//! - **Context** (`context.rs`) - cancellation and deadline for a round
//! - **Ports** (`ports.rs`) - trait abstractions for the registry, executor and metrics sink
//!
//! # Usage
//!
//! ```ignore
//! use healthcheck::domain::{Probe, ProbeCategory, ProbeContext, ProbeStore};
//!
//! let probe = Probe::from_fn("cache", ProbeCategory::Readiness, |_ctx| async { Ok(()) });
//! store.add(vec![probe])?;
//! ```

pub mod context;
pub mod ports;
pub mod probe;

pub use context::ProbeContext;
pub use ports::{Executor, Exposition, MetricsSink, ProbeStore};
pub use probe::{ExecutionResult, Probe, ProbeCategory, ProbeCheck, ProbeHealth};
