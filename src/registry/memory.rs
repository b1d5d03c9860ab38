//! In-Memory Probe Store
//!
//! Implements the `ProbeStore` port with a single reader/writer lock around a
//! name-keyed map.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::ports::ProbeStore;
use crate::domain::probe::{Probe, ProbeCategory, ProbeHealth};
use crate::error::{Error, Result};

/// Probe registry keyed by probe name.
#[derive(Debug, Default)]
pub struct InMemoryProbeStore {
    probes: RwLock<HashMap<String, Probe>>,
}

impl InMemoryProbeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `probes`.
    pub fn with_probes(probes: Vec<Probe>) -> Result<Self> {
        let store = Self::new();
        store.add(probes)?;
        Ok(store)
    }

    /// Names of every registered probe, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.probes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl ProbeStore for InMemoryProbeStore {
    fn add(&self, probes: Vec<Probe>) -> Result<()> {
        // Validate the whole batch before taking the write lock so a bad
        // probe leaves the store untouched.
        if let Some(bad) = probes.iter().find(|p| p.name().trim().is_empty()) {
            return Err(Error::invalid_probe(
                "name",
                format!("{} probe has an empty name", bad.category()),
            ));
        }

        let mut map = self.probes.write();
        for probe in probes {
            debug!(probe = %probe.name(), kind = %probe.category(), "Registering probe");
            map.insert(probe.name().to_string(), probe.with_health(ProbeHealth::Unknown));
        }

        Ok(())
    }

    fn get(&self, name: &str) -> Option<Probe> {
        self.probes.read().get(name).cloned()
    }

    fn get_all(&self) -> Vec<Probe> {
        self.probes.read().values().cloned().collect()
    }

    fn get_by_category(&self, category: ProbeCategory) -> Vec<Probe> {
        if category == ProbeCategory::OnDemand {
            return self.get_all();
        }

        self.probes
            .read()
            .values()
            .filter(|p| p.category() == category)
            .cloned()
            .collect()
    }

    fn delete(&self, names: &[&str]) {
        let mut map = self.probes.write();
        for name in names {
            if map.remove(*name).is_some() {
                debug!(probe = %name, "Unregistered probe");
            }
        }
    }

    fn len(&self) -> usize {
        self.probes.read().len()
    }
}

// =============================================================================
// Tests
// =============================================================================
