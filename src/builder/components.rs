//! Component status probes
//!
//! Lets an application flip readiness per subcomponent at runtime.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::probe::{Probe, ProbeCategory};
use crate::error::CheckError;

/// Shared, mutable map of component name to up/down flag.
#[derive(Debug, Clone, Default)]
pub struct ComponentStatusBoard {
    components: Arc<DashMap<String, bool>>,
}

impl ComponentStatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, component: impl Into<String>, up: bool) {
        self.components.insert(component.into(), up);
    }

    /// `false` for unknown components.
    pub fn is_up(&self, component: &str) -> bool {
        self.components
            .get(component)
            .map(|entry| *entry.value())
            .unwrap_or(false)
    }

    pub fn remove(&self, component: &str) {
        self.components.remove(component);
    }

    /// Component names, sorted.
    pub fn components(&self) -> Vec<String> {
        let mut names: Vec<_> = self.components.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for ComponentStatusBoard {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let board = Self::new();
        for (name, up) in iter {
            board.set(name, up);
        }
        board
    }
}

/// One probe per component currently on `board`, named `component <name>`.
///
/// Each probe reads its flag on every execution and fails while it is `false`.
pub fn for_components(category: ProbeCategory, board: &ComponentStatusBoard) -> Vec<Probe> {
    board
        .components()
        .into_iter()
        .map(|component| {
            let board = board.clone();
            let name = format!("component {}", component);
            Probe::from_fn(name, category, move |_ctx| {
                let up = board.is_up(&component);
                let component = component.clone();
                async move {
                    if up {
                        Ok(())
                    } else {
                        Err(CheckError::Failed(format!(
                            "component '{}' is set to 'false'",
                            component
                        )))
                    }
                }
            })
        })
        .collect()
}
