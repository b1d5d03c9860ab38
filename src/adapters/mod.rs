//! Metrics Sink Adapters
//!
//! Implementations of the [`MetricsSink`](crate::domain::ports::MetricsSink) port.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Layer                              │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │                    Ports (Traits)                           │ │
//! │  │                     MetricsSink                             │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters (This Module)                       │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │ PrometheusMetricsSink │ InMemoryMetricsSink │ NoopMetrics  │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use healthcheck::adapters::PrometheusMetricsSink;
//! use healthcheck::domain::ports::MetricsSink;
//!
//! let sink = PrometheusMetricsSink::new("myapp")?;
//! sink.update(&results);
//! let exposition = sink.exposition()?;
//! ```

mod memory;
mod noop;
mod prometheus;

pub use memory::InMemoryMetricsSink;
pub use noop::NoopMetricsSink;
pub use prometheus::PrometheusMetricsSink;
