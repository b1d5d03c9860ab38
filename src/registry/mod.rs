//! Probe Registry
//!
//! Owns the canonical probe set. Callers always receive owned snapshots.

mod memory;

pub use memory::InMemoryProbeStore;
