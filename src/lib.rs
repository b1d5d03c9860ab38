//! Healthcheck - Probe Registry and Kubernetes Health Endpoints
//!
//! Register named health probes, run them concurrently on demand, and expose
//! the result as Kubernetes-style liveness, readiness and startup endpoints
//! plus a Prometheus gauge per probe.
//!
//! # Architecture
//!
//! ```text
//! HTTP request → HealthService → Executor → ProbeCheck(s)
//!                     │                          │
//!                     ▼                          ▼
//!                ProbeStore                 MetricsSink
//! ```
//!
//! # Modules
//!
//! - [`adapters`] - Metrics sink implementations
//! - [`builder`] - Validated probe construction and presets
//! - [`checks`] - Built-in TCP, DNS and HTTP checks
//! - [`config`] - Server configuration and probe definitions
//! - [`domain`] - Probe types, execution context and ports
//! - [`error`] - Error types
//! - [`executor`] - Concurrent execution engine
//! - [`registry`] - In-memory probe registry
//! - [`server`] - HTTP endpoints
//! - [`service`] - Aggregation and status policy

pub mod adapters;
pub mod builder;
pub mod checks;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod registry;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use adapters::{InMemoryMetricsSink, NoopMetricsSink, PrometheusMetricsSink};
pub use builder::{deadmans_snitch, liveness_probe, ComponentStatusBoard, ProbeBuilder};
pub use config::{ProbeDefinition, ServerConfig};
pub use domain::{ExecutionResult, Probe, ProbeCategory, ProbeCheck, ProbeContext, ProbeHealth};
pub use error::{CheckError, Error, Result};
pub use executor::ConcurrentExecutor;
pub use registry::InMemoryProbeStore;
pub use server::HealthServer;
pub use service::{CategoryReport, HealthService, Outcome};
