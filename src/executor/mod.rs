//! Execution Engine
//!
//! Runs a snapshot of probes concurrently and collects one result per probe.

mod concurrent;

pub use concurrent::ConcurrentExecutor;
